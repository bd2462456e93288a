//! Folder-path resolution against the local tree.
//!
//! Same contract as the remote resolver in `marksync-client`: walk the path
//! left to right from the default container, adopting existing folders and
//! creating missing ones, with concurrent creations of the same
//! `name:parent` segment deduplicated through the shared single-flight
//! primitive.

use crate::local_tree::{LocalTreeAdapter, TreeError};
use marksync_client::{SingleFlight, folder_key};
use std::sync::Arc;
use tracing::debug;

/// Outcome of resolving a folder path locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalResolution {
    /// Id of the final path segment's folder; the default container for the
    /// empty path.
    pub folder_id: String,
    /// Names of the segments that had to be created, in walk order.
    pub created: Vec<String>,
}

/// Resolves folder paths in the local tree with create-if-missing semantics.
pub struct LocalPathResolver {
    tree: Arc<dyn LocalTreeAdapter>,
    create_locks: SingleFlight<(String, bool), TreeError>,
}

impl LocalPathResolver {
    pub fn new(tree: Arc<dyn LocalTreeAdapter>) -> Self {
        Self {
            tree,
            create_locks: SingleFlight::new(),
        }
    }

    /// Resolves `path` to a local folder id, creating missing segments
    /// under the default container.
    pub async fn resolve(&self, path: &[String]) -> Result<LocalResolution, TreeError> {
        let mut current_parent = self.tree.default_parent_id();
        let mut created = Vec::new();

        for name in path {
            let (folder_id, was_created) = self.ensure_child(&current_parent, name).await?;
            if was_created {
                debug!("created local folder '{name}' under {current_parent}");
                created.push(name.clone());
            }
            current_parent = folder_id;
        }

        Ok(LocalResolution {
            folder_id: current_parent,
            created,
        })
    }

    /// Returns the child folder `name` of `parent`, creating it if missing.
    async fn ensure_child(&self, parent: &str, name: &str) -> Result<(String, bool), TreeError> {
        if let Some(existing) = self.find_child_folder(parent, name).await? {
            return Ok((existing, false));
        }

        let key = folder_key(name, Some(parent));
        let tree = self.tree.clone();
        let parent = parent.to_string();
        let name = name.to_string();

        self.create_locks
            .run(&key, move || async move {
                // Re-check inside the flight: a racing resolver may have
                // created the folder between our miss and our turn.
                let children = tree.get_children(&parent).await?;
                if let Some(f) = children
                    .iter()
                    .find(|c| c.is_folder() && c.title == name)
                {
                    return Ok((f.id.clone(), false));
                }
                let node = tree.create(&parent, &name, None).await?;
                Ok((node.id, true))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    async fn find_child_folder(
        &self,
        parent: &str,
        name: &str,
    ) -> Result<Option<String>, TreeError> {
        let children = self.tree.get_children(parent).await?;
        Ok(children
            .into_iter()
            .find(|c| c.is_folder() && c.title == name)
            .map(|c| c.id))
    }
}
