//! Reverse sync — one-shot reconciliation pulling Markhub state into the
//! local tree.
//!
//! The pass is best-effort and idempotent: folders match by path, bookmarks
//! by URL, and only the minimum set of local mutations is issued. A failure
//! fetching the export or reading the local tree aborts the pass; any
//! per-item failure is recorded and processing continues, so one bad
//! bookmark never blocks the rest of the batch.

use crate::local_resolver::LocalPathResolver;
use crate::local_tree::LocalTreeAdapter;
use marksync_client::RemoteStoreClient;
use marksync_types::{ExportedBookmark, LocalNode, SyncReport, folder_path_of};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const DEFAULT_PACING: Duration = Duration::from_millis(50);

/// Runs full remote→local reconciliation passes.
pub struct ReverseSyncManager {
    remote: RemoteStoreClient,
    tree: Arc<dyn LocalTreeAdapter>,
    resolver: LocalPathResolver,
    /// Delay between local mutation calls, respecting host API rate
    /// expectations.
    pacing: Duration,
}

impl ReverseSyncManager {
    pub fn new(remote: RemoteStoreClient, tree: Arc<dyn LocalTreeAdapter>) -> Self {
        let resolver = LocalPathResolver::new(tree.clone());
        Self {
            remote,
            tree,
            resolver,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Performs one reconciliation pass and returns the accumulated report.
    pub async fn sync_from_markhub(&self) -> SyncReport {
        let export = match self.remote.export().await {
            Ok(e) => e,
            Err(e) => {
                warn!("reverse sync aborted: export fetch failed: {e}");
                return SyncReport::aborted(format!("export fetch failed: {e}"));
            }
        };

        let nodes = match self.tree.full_tree().await {
            Ok(n) => n,
            Err(e) => {
                warn!("reverse sync aborted: local tree read failed: {e}");
                return SyncReport::aborted(format!("local tree read failed: {e}"));
            }
        };

        let by_id: HashMap<String, LocalNode> =
            nodes.iter().map(|n| (n.id.clone(), n.clone())).collect();

        // Local folder paths (each path names the folder itself, not just
        // its ancestors) and the URL index driving bookmark identity.
        let mut local_folder_paths: HashSet<Vec<String>> = HashSet::new();
        let mut by_url: HashMap<String, LocalNode> = HashMap::new();
        for node in &nodes {
            if let Some(url) = &node.url {
                by_url.insert(url.clone(), node.clone());
            } else if node.parent_id.is_some() {
                let path = folder_path_of(&by_id, Some(&node.id));
                if !path.is_empty() {
                    local_folder_paths.insert(path);
                }
            }
        }

        let mut report = SyncReport::new();

        // Folders first, parents before children, so every bookmark below
        // finds its target resolvable.
        let mut missing: Vec<_> = export
            .folders
            .iter()
            .filter(|f| !f.path.is_empty() && !local_folder_paths.contains(&f.path))
            .collect();
        missing.sort_by_key(|f| f.path.len());

        for folder in missing {
            match self.resolver.resolve(&folder.path).await {
                Ok(res) => {
                    report.folders_created += res.created.len();
                    local_folder_paths.insert(folder.path.clone());
                    if !res.created.is_empty() {
                        self.pace().await;
                    }
                }
                Err(e) => {
                    report.record_error(format!("folder {:?}: {e}", folder.path));
                }
            }
        }

        for bookmark in &export.bookmarks {
            match self.apply_bookmark(bookmark, &mut by_url, &mut report).await {
                Ok(applied) => {
                    if applied {
                        self.pace().await;
                    }
                }
                Err(e) => {
                    report.record_error(format!("bookmark {}: {e}", bookmark.url));
                }
            }
        }

        info!(
            "reverse sync: {} folders created, {} bookmarks created, {} updated, {} skipped, {} errors",
            report.folders_created,
            report.bookmarks_created,
            report.bookmarks_updated,
            report.skipped,
            report.errors.len()
        );
        report
    }

    /// Reconciles one remote bookmark. Returns whether a local mutation
    /// happened (which paces the loop).
    async fn apply_bookmark(
        &self,
        bookmark: &ExportedBookmark,
        by_url: &mut HashMap<String, LocalNode>,
        report: &mut SyncReport,
    ) -> Result<bool, crate::error::EngineError> {
        if let Some(existing) = by_url.get(&bookmark.url) {
            if existing.title == bookmark.title {
                report.skipped += 1;
                return Ok(false);
            }
            // Remote is authoritative for the title, and for the title only.
            let updated = self
                .tree
                .update_title(&existing.id, &bookmark.title)
                .await?;
            by_url.insert(bookmark.url.clone(), updated);
            report.bookmarks_updated += 1;
            return Ok(true);
        }

        let res = self.resolver.resolve(&bookmark.folder_path).await?;
        // The export's folder list normally covers this path already, but a
        // bookmark can reference a folder created mid-pass on the server.
        report.folders_created += res.created.len();

        let node = self
            .tree
            .create(&res.folder_id, &bookmark.title, Some(&bookmark.url))
            .await?;
        debug!("created local bookmark {} in {}", node.id, res.folder_id);
        by_url.insert(bookmark.url.clone(), node);
        report.bookmarks_created += 1;
        Ok(true)
    }

    async fn pace(&self) {
        if !self.pacing.is_zero() {
            sleep(self.pacing).await;
        }
    }
}
