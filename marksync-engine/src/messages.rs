//! Typed messages exchanged with the presentation layer.
//!
//! The engine produces [`UiMessage`]s and consumes [`UiCommand`]s; both are
//! tagged JSON so the host's message bus can route them. Every inbound
//! command is acknowledged with a [`MessageAck`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Messages produced for the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum UiMessage {
    ShowAiProcessing,
    ShowAiError {
        message: String,
    },
    ShowFolderRecommendation {
        bookmark_title: String,
        recommended_folder: String,
        bookmark_id: String,
        confidence: f64,
        reason: String,
        is_already_in_folder: bool,
    },
    ShowSyncError {
        message: String,
    },
}

/// Inbound commands from the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum UiCommand {
    AcceptFolderRecommendation { bookmark_id: String },
    DismissFolderRecommendation { bookmark_id: String },
}

/// Acknowledgement for an inbound command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn err(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// The presentation surface was not reachable (no open UI, closed port).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("no active UI surface")]
pub struct ChannelUnavailable;

/// Outbound channel to the presentation layer. Sends are best-effort: an
/// unavailable surface is an expected state, not a failure of the engine.
#[async_trait]
pub trait UiChannel: Send + Sync {
    async fn send(&self, message: UiMessage) -> Result<(), ChannelUnavailable>;
}

/// A channel with no surface attached; every send reports unavailable.
pub struct NullUiChannel;

#[async_trait]
impl UiChannel for NullUiChannel {
    async fn send(&self, _message: UiMessage) -> Result<(), ChannelUnavailable> {
        Err(ChannelUnavailable)
    }
}

#[async_trait]
impl UiChannel for tokio::sync::mpsc::Sender<UiMessage> {
    async fn send(&self, message: UiMessage) -> Result<(), ChannelUnavailable> {
        tokio::sync::mpsc::Sender::send(self, message)
            .await
            .map_err(|_| ChannelUnavailable)
    }
}
