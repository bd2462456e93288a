//! TTL cache of the remote folder list.
//!
//! Path resolution looks folders up by `(name, parent_id)` far more often
//! than the list changes, so the full list is cached and refreshed when it
//! goes stale. Auth failures invalidate the cache along with the token.

use marksync_types::RemoteFolder;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct CacheState {
    fetched_at: Instant,
    folders: Vec<RemoteFolder>,
}

/// Cached remote folder list with a freshness window.
pub struct FolderCache {
    ttl: Duration,
    state: RwLock<Option<CacheState>>,
}

impl FolderCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(None),
        }
    }

    /// True if a list is cached and younger than the TTL.
    pub async fn is_fresh(&self) -> bool {
        let state = self.state.read().await;
        state
            .as_ref()
            .is_some_and(|s| s.fetched_at.elapsed() < self.ttl)
    }

    /// Replaces the cached list.
    pub async fn fill(&self, folders: Vec<RemoteFolder>) {
        let mut state = self.state.write().await;
        *state = Some(CacheState {
            fetched_at: Instant::now(),
            folders,
        });
    }

    /// Adds a newly created folder without resetting the list's age.
    pub async fn insert(&self, folder: RemoteFolder) {
        let mut state = self.state.write().await;
        if let Some(s) = state.as_mut() {
            s.folders.retain(|f| f.id != folder.id);
            s.folders.push(folder);
        }
    }

    /// Looks up a folder by name under a parent. Only consults a fresh list;
    /// a stale cache behaves like a miss.
    pub async fn lookup(&self, name: &str, parent_id: Option<&str>) -> Option<RemoteFolder> {
        let state = self.state.read().await;
        let s = state.as_ref()?;
        if s.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        s.folders
            .iter()
            .find(|f| f.name == name && f.parent_id.as_deref() == parent_id)
            .cloned()
    }

    /// Returns the cached list regardless of freshness (for diagnostics).
    pub async fn snapshot(&self) -> Vec<RemoteFolder> {
        let state = self.state.read().await;
        state.as_ref().map(|s| s.folders.clone()).unwrap_or_default()
    }

    /// Drops the cached list entirely.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        *state = None;
    }
}
