//! Forward sync — local mutation events propagated to Markhub.
//!
//! Every remote write is addressed by a stable external key (URL for
//! bookmarks, path for folders), so handlers completing out of delivery
//! order cannot corrupt earlier writes. The `synced` set is a best-effort
//! in-process dedup: it is marked before the network call and unmarked on
//! failure so any later event on the same node retries, and it is
//! deliberately not persisted — a respawned process simply redoes in-flight
//! work against idempotent endpoints.

use crate::error::{EngineError, EngineResult};
use crate::local_tree::{LocalTreeAdapter, node_folder_path};
use crate::messages::{UiChannel, UiMessage};
use marksync_client::RemoteStoreClient;
use marksync_types::LocalNode;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Propagates local tree events to the remote store.
pub struct ForwardSyncEngine {
    remote: RemoteStoreClient,
    tree: Arc<dyn LocalTreeAdapter>,
    ui: Arc<dyn UiChannel>,
    /// Local bookmark ids already pushed this process lifetime.
    synced: Mutex<HashSet<String>>,
    /// Local id → remote id, the only way deletions can be addressed once
    /// the local node is gone.
    remote_ids: Mutex<HashMap<String, String>>,
}

impl ForwardSyncEngine {
    pub fn new(
        remote: RemoteStoreClient,
        tree: Arc<dyn LocalTreeAdapter>,
        ui: Arc<dyn UiChannel>,
    ) -> Self {
        Self {
            remote,
            tree,
            ui,
            synced: Mutex::new(HashSet::new()),
            remote_ids: Mutex::new(HashMap::new()),
        }
    }

    /// Clears all in-process state. Called on (re)initialization.
    pub async fn reset(&self) {
        self.synced.lock().await.clear();
        self.remote_ids.lock().await.clear();
    }

    pub async fn on_created(&self, node: &LocalNode) -> EngineResult<()> {
        if node.is_folder() {
            debug!("folder creation {} not forwarded", node.id);
            return Ok(());
        }
        self.sync_create(node).await
    }

    pub async fn on_changed(&self, node: &LocalNode) -> EngineResult<()> {
        if node.is_folder() {
            // Folder renames are not propagated; contained bookmarks
            // converge through their own events or a reverse pass.
            debug!("folder change {} not forwarded", node.id);
            return Ok(());
        }
        self.sync_update(node).await
    }

    pub async fn on_moved(&self, node: &LocalNode) -> EngineResult<()> {
        if node.is_folder() {
            debug!("folder move {} not forwarded", node.id);
            return Ok(());
        }
        self.sync_update(node).await
    }

    pub async fn on_removed(&self, id: &str) -> EngineResult<()> {
        self.sync_delete(id).await
    }

    /// Pushes a newly created bookmark. Duplicate created events for a node
    /// already marked synced are dropped.
    pub async fn sync_create(&self, node: &LocalNode) -> EngineResult<()> {
        let Some(url) = node.url.clone() else {
            return Ok(());
        };

        {
            let mut synced = self.synced.lock().await;
            if !synced.insert(node.id.clone()) {
                debug!("bookmark {} already synced, skipping create", node.id);
                return Ok(());
            }
        }

        let result = self.push(node, &url).await;
        if let Err(e) = &result {
            self.synced.lock().await.remove(&node.id);
            self.report_failure("bookmark create", e).await;
        }
        result
    }

    /// Pushes the current state of a changed or moved bookmark.
    pub async fn sync_update(&self, node: &LocalNode) -> EngineResult<()> {
        let Some(url) = node.url.clone() else {
            return Ok(());
        };

        self.synced.lock().await.insert(node.id.clone());

        let result = self.push(node, &url).await;
        if let Err(e) = &result {
            self.synced.lock().await.remove(&node.id);
            self.report_failure("bookmark update", e).await;
        }
        result
    }

    /// Deletes the remote counterpart of a removed local bookmark. Without
    /// a recorded remote id (never synced this lifetime, or a folder) the
    /// deletion is a no-op.
    pub async fn sync_delete(&self, id: &str) -> EngineResult<()> {
        self.synced.lock().await.remove(id);
        let mapping = self.remote_ids.lock().await.remove(id);

        let Some(remote_id) = mapping else {
            debug!("no remote mapping for removed node {id}, nothing to delete");
            return Ok(());
        };

        match self.remote.delete_bookmark(&remote_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let err = EngineError::from(e);
                self.report_failure("bookmark delete", &err).await;
                Err(err)
            }
        }
    }

    /// The idempotent remote write: resolve the node's ancestor path to a
    /// remote folder id, then upsert by URL.
    async fn push(&self, node: &LocalNode, url: &str) -> EngineResult<()> {
        let path = node_folder_path(self.tree.as_ref(), node).await?;
        let resolution = self.remote.resolve_folder_path(&path).await?;
        let (bookmark, created) = self
            .remote
            .upsert_bookmark(&node.title, url, resolution.folder_id.as_deref())
            .await?;

        debug!(
            "pushed bookmark {} -> remote {} ({})",
            node.id,
            bookmark.id,
            if created { "created" } else { "updated" }
        );
        self.remote_ids
            .lock()
            .await
            .insert(node.id.clone(), bookmark.id);
        Ok(())
    }

    async fn report_failure(&self, what: &str, err: &EngineError) {
        warn!("forward sync: {what} failed: {err}");
        let _ = self
            .ui
            .send(UiMessage::ShowSyncError {
                message: format!("{what} failed: {err}"),
            })
            .await;
    }
}
