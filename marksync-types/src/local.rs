//! Local tree node shape and subscription events.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Folder names the host tree reserves for its permanent top-level
/// containers. They never participate in path matching: a folder's path is
/// the ancestor chain *between* these containers and the folder itself.
pub const RESERVED_FOLDERS: &[&str] = &[
    "Bookmarks Bar",
    "Bookmarks Menu",
    "Other Bookmarks",
    "Mobile Bookmarks",
];

/// Returns true for the root and the host's permanent top-level folders.
pub fn is_reserved_folder(name: &str) -> bool {
    RESERVED_FOLDERS.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// A node in the host's native bookmark tree.
///
/// Owned and mutated exclusively by the host; the engine reads nodes and
/// issues mutation commands through the tree adapter. A node with no URL is
/// a folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalNode {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub parent_id: Option<String>,
}

impl LocalNode {
    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }

    pub fn is_bookmark(&self) -> bool {
        self.url.is_some()
    }
}

/// Mutation events delivered by the host tree subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    Created(LocalNode),
    Changed(LocalNode),
    Moved(LocalNode),
    Removed { id: String },
}

/// Computes a folder path from a full-tree snapshot: the titles of the
/// chain starting at `start` and walking to the root, ordered root-first,
/// excluding the root node and reserved container folders.
///
/// Pass a bookmark's containing folder to get the bookmark's folder path,
/// or a folder's own id to get the path naming that folder (`None` → empty
/// path). Cycles and dangling parent ids terminate the walk rather than
/// looping.
pub fn folder_path_of(nodes: &HashMap<String, LocalNode>, start: Option<&str>) -> Vec<String> {
    let mut path = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let mut cursor = start.map(|s| s.to_string());

    while let Some(id) = cursor {
        if !seen.insert(id.clone()) {
            break;
        }
        let Some(node) = nodes.get(&id) else { break };
        // The root has no parent and contributes nothing to the path.
        if node.parent_id.is_some() && !is_reserved_folder(&node.title) {
            path.push(node.title.clone());
        }
        cursor = node.parent_id.clone();
    }

    path.reverse();
    path
}
