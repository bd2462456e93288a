//! Shared fixtures for the engine test suites.
#![allow(dead_code)]

use async_trait::async_trait;
use marksync_client::config::RemoteConfig;
use marksync_client::RemoteStoreClient;
use marksync_engine::{
    ChannelUnavailable, EngineError, EngineResult, FolderScorer, FolderSuggestion, UiChannel,
    UiMessage,
};
use marksync_types::LocalNode;
use tokio::sync::Mutex;
use wiremock::MockServer;

/// An authenticated client pointed at the mock server, with the client-side
/// walk enabled (no ensure-path endpoint in these suites).
pub async fn remote(server: &MockServer) -> RemoteStoreClient {
    let config = RemoteConfig {
        api_base_url: server.uri(),
        folder_cache_ttl_secs: 30,
        request_timeout_secs: 5,
        prefer_ensure_path: false,
    };
    let client = RemoteStoreClient::new(config);
    client.set_token("tok".into()).await;
    client
}

pub fn bookmark_json(id: &str, title: &str, url: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "title": title, "url": url, "folder_id": null })
}

pub fn folder_json(id: &str, name: &str, parent_id: Option<&str>) -> serde_json::Value {
    serde_json::json!({ "id": id, "name": name, "parent_id": parent_id })
}

/// A UI surface that records everything sent to it.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<UiMessage>>,
}

impl RecordingChannel {
    pub async fn sent(&self) -> Vec<UiMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl UiChannel for RecordingChannel {
    async fn send(&self, message: UiMessage) -> Result<(), ChannelUnavailable> {
        self.sent.lock().await.push(message);
        Ok(())
    }
}

/// A scorer that always returns the same suggestion.
pub struct FixedScorer(pub FolderSuggestion);

#[async_trait]
impl FolderScorer for FixedScorer {
    async fn recommend(
        &self,
        _title: &str,
        _url: &str,
        _folders: &[LocalNode],
    ) -> EngineResult<FolderSuggestion> {
        Ok(self.0.clone())
    }
}

/// A scorer that always fails, as a timed-out model would.
pub struct FailScorer;

#[async_trait]
impl FolderScorer for FailScorer {
    async fn recommend(
        &self,
        _title: &str,
        _url: &str,
        _folders: &[LocalNode],
    ) -> EngineResult<FolderSuggestion> {
        Err(EngineError::Scorer("model timeout".into()))
    }
}

pub fn suggestion(folder_id: &str, folder_name: &str, confidence: f64) -> FolderSuggestion {
    FolderSuggestion {
        folder_id: folder_id.to_string(),
        folder_name: folder_name.to_string(),
        confidence,
        reason: "looks related".to_string(),
    }
}
