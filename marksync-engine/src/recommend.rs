//! Folder recommendation workflow.
//!
//! A newly created bookmark may be routed through an external scorer that
//! suggests a better folder before the bookmark is synced. The workflow is
//! a per-bookmark state machine:
//!
//! ```text
//! NEW → REQUESTED → { SUGGESTED | SAME_FOLDER | FAILED | NO_FOLDERS }
//!                       ↓
//!                 { ACCEPTED | DISMISSED }
//! ```
//!
//! The single authoritative pending table holds at most one live entry per
//! bookmark id. It is never persisted: a process restart implicitly
//! dismisses everything in it. Whatever branch the workflow takes, the
//! bookmark ends up synced — accept moves it locally and lets the move
//! event perform the one remote upsert; every other terminal state forwards
//! the bookmark unmodified.

use crate::error::{EngineError, EngineResult};
use crate::forward::ForwardSyncEngine;
use crate::local_tree::LocalTreeAdapter;
use crate::messages::{UiChannel, UiMessage};
use crate::settings::SyncSettings;
use async_trait::async_trait;
use marksync_types::{LocalNode, is_reserved_folder};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Suggestions at or above this confidence may be accepted without user
/// input when no UI surface is reachable and auto-accept is enabled.
pub const AUTO_ACCEPT_CONFIDENCE: f64 = 0.7;

/// Terminal and intermediate states of one bookmark's workflow run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecommendationState {
    New,
    Requested,
    Suggested,
    SameFolder,
    Failed,
    NoFolders,
    Accepted,
    Dismissed,
}

/// A folder suggestion from the scorer.
#[derive(Clone, Debug, PartialEq)]
pub struct FolderSuggestion {
    /// Local folder id the bookmark should move to.
    pub folder_id: String,
    pub folder_name: String,
    /// Scorer confidence in `[0, 1]`.
    pub confidence: f64,
    pub reason: String,
}

/// The external AI model, consumed as an opaque scorer.
#[async_trait]
pub trait FolderScorer: Send + Sync {
    /// Suggests a folder for `(title, url)` out of `folders` (the current
    /// local folder list). May fail or time out.
    async fn recommend(
        &self,
        title: &str,
        url: &str,
        folders: &[LocalNode],
    ) -> EngineResult<FolderSuggestion>;
}

/// A suggestion awaiting the user's accept/dismiss decision.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRecommendation {
    pub bookmark_id: String,
    pub recommended_folder_id: String,
    pub recommended_folder_name: String,
    pub confidence: f64,
    pub reason: String,
    pub original_parent_id: Option<String>,
}

/// Runs the recommendation decision for newly created bookmarks.
pub struct RecommendationWorkflow {
    scorer: Arc<dyn FolderScorer>,
    tree: Arc<dyn LocalTreeAdapter>,
    forward: Arc<ForwardSyncEngine>,
    ui: Arc<dyn UiChannel>,
    settings: Arc<RwLock<SyncSettings>>,
    pending: Mutex<HashMap<String, PendingRecommendation>>,
}

impl RecommendationWorkflow {
    pub fn new(
        scorer: Arc<dyn FolderScorer>,
        tree: Arc<dyn LocalTreeAdapter>,
        forward: Arc<ForwardSyncEngine>,
        ui: Arc<dyn UiChannel>,
        settings: Arc<RwLock<SyncSettings>>,
    ) -> Self {
        Self {
            scorer,
            tree,
            forward,
            ui,
            settings,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Drops every pending recommendation — the implicit dismissal a
    /// process restart performs.
    pub async fn clear_pending(&self) {
        self.pending.lock().await.clear();
    }

    /// The live pending entry for a bookmark, if any.
    pub async fn pending_for(&self, bookmark_id: &str) -> Option<PendingRecommendation> {
        self.pending.lock().await.get(bookmark_id).cloned()
    }

    /// Runs the workflow for a newly created bookmark and returns the state
    /// it settled in. Never leaves the bookmark unsynced: every path that
    /// does not move it forwards it to `sync_create` unmodified.
    pub async fn process_created(&self, node: &LocalNode) -> EngineResult<RecommendationState> {
        let Some(url) = node.url.clone() else {
            return Ok(RecommendationState::New);
        };
        let settings = self.settings.read().await.clone();

        if settings.notifications_enabled {
            let _ = self.ui.send(UiMessage::ShowAiProcessing).await;
        }

        let folders = self.candidate_folders().await?;
        if folders.is_empty() {
            debug!("no candidate folders, syncing {} as-is", node.id);
            self.forward.sync_create(node).await?;
            return Ok(RecommendationState::NoFolders);
        }

        let suggestion = match self.scorer.recommend(&node.title, &url, &folders).await {
            Ok(s) => s,
            Err(e) => {
                warn!("folder scorer failed for {}: {e}", node.id);
                if settings.notifications_enabled {
                    let _ = self
                        .ui
                        .send(UiMessage::ShowAiError {
                            message: e.to_string(),
                        })
                        .await;
                }
                self.forward.sync_create(node).await?;
                return Ok(RecommendationState::Failed);
            }
        };

        if node.parent_id.as_deref() == Some(suggestion.folder_id.as_str()) {
            // Confirmation only — the bookmark already sits where the
            // scorer wants it, so it syncs immediately.
            let _ = self
                .ui
                .send(self.recommendation_message(node, &suggestion, true))
                .await;
            self.forward.sync_create(node).await?;
            return Ok(RecommendationState::SameFolder);
        }

        {
            let mut pending = self.pending.lock().await;
            pending.insert(
                node.id.clone(),
                PendingRecommendation {
                    bookmark_id: node.id.clone(),
                    recommended_folder_id: suggestion.folder_id.clone(),
                    recommended_folder_name: suggestion.folder_name.clone(),
                    confidence: suggestion.confidence,
                    reason: suggestion.reason.clone(),
                    original_parent_id: node.parent_id.clone(),
                },
            );
        }

        match self
            .ui
            .send(self.recommendation_message(node, &suggestion, false))
            .await
        {
            Ok(()) => Ok(RecommendationState::Suggested),
            Err(_) if settings.auto_accept && suggestion.confidence >= AUTO_ACCEPT_CONFIDENCE => {
                debug!(
                    "no UI surface, auto-accepting {} at confidence {:.2}",
                    node.id, suggestion.confidence
                );
                self.accept(&node.id).await?;
                Ok(RecommendationState::Accepted)
            }
            Err(_) => {
                // No surface to decide on and no auto-accept: dismiss so
                // the bookmark still syncs.
                self.dismiss(&node.id).await?;
                Ok(RecommendationState::Dismissed)
            }
        }
    }

    /// Accepts the pending recommendation: moves the bookmark locally and
    /// lets the resulting move event perform the remote upsert. No direct
    /// `sync_create`/`sync_update` call happens here.
    pub async fn accept(&self, bookmark_id: &str) -> EngineResult<()> {
        let rec = self
            .pending
            .lock()
            .await
            .remove(bookmark_id)
            .ok_or_else(|| EngineError::UnknownRecommendation(bookmark_id.to_string()))?;

        match self
            .tree
            .move_node(&rec.bookmark_id, &rec.recommended_folder_id)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                // Target folder may have vanished. The bookmark must not be
                // left unsynced, so push it from wherever it still is.
                warn!("accept: move of {bookmark_id} failed: {e}");
                if let Ok(node) = self.tree.get(bookmark_id).await {
                    let _ = self.forward.sync_create(&node).await;
                }
                Err(e.into())
            }
        }
    }

    /// Dismisses the pending recommendation and syncs the bookmark
    /// unmodified.
    pub async fn dismiss(&self, bookmark_id: &str) -> EngineResult<()> {
        let rec = self
            .pending
            .lock()
            .await
            .remove(bookmark_id)
            .ok_or_else(|| EngineError::UnknownRecommendation(bookmark_id.to_string()))?;

        let node = self.tree.get(&rec.bookmark_id).await?;
        self.forward.sync_create(&node).await
    }

    fn recommendation_message(
        &self,
        node: &LocalNode,
        suggestion: &FolderSuggestion,
        is_already_in_folder: bool,
    ) -> UiMessage {
        UiMessage::ShowFolderRecommendation {
            bookmark_title: node.title.clone(),
            recommended_folder: suggestion.folder_name.clone(),
            bookmark_id: node.id.clone(),
            confidence: suggestion.confidence,
            reason: suggestion.reason.clone(),
            is_already_in_folder,
        }
    }

    /// User-addressable folders: everything except the root and the
    /// reserved containers.
    async fn candidate_folders(&self) -> EngineResult<Vec<LocalNode>> {
        let nodes = self.tree.full_tree().await?;
        Ok(nodes
            .into_iter()
            .filter(|n| {
                n.is_folder() && n.parent_id.is_some() && !is_reserved_folder(&n.title)
            })
            .collect())
    }
}
