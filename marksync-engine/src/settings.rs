//! Sync settings, owned by the host's settings module.
//!
//! The engine never persists settings itself; it rehydrates them through
//! [`SettingsStore`] on every (re)initialization, which is all an ephemeral
//! host process allows.

use crate::error::EngineResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Durable configuration consumed by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Bearer token for the Markhub API; `None` until the user signs in.
    pub auth_token: Option<String>,
    /// Master switch for both sync directions.
    pub sync_enabled: bool,
    /// Whether newly created bookmarks go through the recommendation
    /// workflow before syncing.
    pub ai_enabled: bool,
    /// Accept high-confidence suggestions without user input when no UI
    /// surface is available.
    pub auto_accept: bool,
    /// Whether to emit processing/error toasts.
    pub notifications_enabled: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            auth_token: None,
            sync_enabled: true,
            ai_enabled: false,
            auto_accept: false,
            notifications_enabled: true,
        }
    }
}

/// Access to the host's durable settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> EngineResult<SyncSettings>;
}

/// A fixed settings snapshot, for tests and headless runs.
pub struct StaticSettings(pub SyncSettings);

#[async_trait]
impl SettingsStore for StaticSettings {
    async fn load(&self) -> EngineResult<SyncSettings> {
        Ok(self.0.clone())
    }
}
