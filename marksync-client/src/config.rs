//! Remote client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Markhub client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL for the Markhub API (e.g., "https://api.markhub.app").
    pub api_base_url: String,

    /// How long the cached folder list stays fresh, in seconds.
    pub folder_cache_ttl_secs: u64,

    /// Per-request timeout applied to the underlying HTTP client, in seconds.
    pub request_timeout_secs: u64,

    /// Whether to try the server-side ensure-path endpoint before walking
    /// a folder path segment by segment.
    pub prefer_ensure_path: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.markhub.app".to_string(),
            folder_cache_ttl_secs: 30,
            request_timeout_secs: 30,
            prefer_ensure_path: true,
        }
    }
}
