//! Folder-path resolution with create-if-missing semantics.
//!
//! `resolve_folder_path` walks an ordered list of folder names from the
//! store root, adopting existing folders and creating missing ones. The walk
//! is race-protected: concurrent resolutions of overlapping paths share one
//! create call per distinct `name:parent` key through the client's
//! creation-lock table, so a burst of bookmarks landing in the same new
//! folder produces exactly one create per segment.

use crate::api_client::RemoteStoreClient;
use crate::error::RemoteResult;
use tracing::debug;

/// Outcome of resolving a folder path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResolution {
    /// Id of the final path segment's folder; `None` for the empty path
    /// (store root).
    pub folder_id: Option<String>,
    /// Names of the segments that had to be created, in walk order.
    pub created: Vec<String>,
}

impl PathResolution {
    pub fn root() -> Self {
        Self {
            folder_id: None,
            created: Vec::new(),
        }
    }
}

/// Lock/cache key for one path segment: `name:parent_id`, with a sentinel
/// for root-level folders.
pub fn folder_key(name: &str, parent_id: Option<&str>) -> String {
    format!("{}:{}", name, parent_id.unwrap_or("root"))
}

impl RemoteStoreClient {
    /// Resolves `path` to a remote folder id, creating missing segments.
    ///
    /// Prefers the server-side ensure-path endpoint when configured; any
    /// non-auth failure there falls back to the client-driven walk, exactly
    /// once per request, so a persistently broken server surfaces its own
    /// error instead of being masked by endless fallbacks.
    pub async fn resolve_folder_path(&self, path: &[String]) -> RemoteResult<PathResolution> {
        if path.is_empty() {
            return Ok(PathResolution::root());
        }

        if self.config.prefer_ensure_path {
            match self.ensure_folder_path_remote(path).await {
                Ok(resolution) => return Ok(resolution),
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    debug!("ensure-path unavailable ({e}), walking path client-side");
                }
            }
        }

        self.walk_folder_path(path).await
    }

    /// Client-driven walk: cache lookup per segment, single-flight create on
    /// miss. The cache is refreshed at most once per walk when a segment
    /// misses against a stale or incomplete list.
    async fn walk_folder_path(&self, path: &[String]) -> RemoteResult<PathResolution> {
        let mut current_parent: Option<String> = None;
        let mut created = Vec::new();
        let mut refreshed = self.folders.is_fresh().await;

        for name in path {
            if let Some(folder) = self.folders.lookup(name, current_parent.as_deref()).await {
                current_parent = Some(folder.id);
                continue;
            }

            // Look-aside: the cache may simply be stale. Refresh once per
            // walk before concluding the folder is missing.
            if !refreshed {
                self.list_folders().await?;
                refreshed = true;
                if let Some(folder) = self.folders.lookup(name, current_parent.as_deref()).await {
                    current_parent = Some(folder.id);
                    continue;
                }
            }

            let (folder, was_created) = self
                .ensure_folder(name, current_parent.as_deref())
                .await?;
            if was_created {
                created.push(name.clone());
            }
            current_parent = Some(folder.id);
        }

        Ok(PathResolution {
            folder_id: current_parent,
            created,
        })
    }
}
