//! Local tree adapter — the narrow contract over the host's bookmark tree.
//!
//! The tree is owned and mutated by the host; the engine reads nodes and
//! issues mutation commands through this trait. Mutation events flow the
//! other way, delivered by the host over an mpsc channel as [`TreeEvent`]s.

use async_trait::async_trait;
use marksync_types::{LocalNode, TreeEvent, is_reserved_folder};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// Errors from the host tree.
#[derive(Clone, Debug, Error)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NotFound(String),

    #[error("tree operation failed: {0}")]
    Backend(String),
}

/// Read/mutate access to the host's bookmark tree.
#[async_trait]
pub trait LocalTreeAdapter: Send + Sync {
    async fn get(&self, id: &str) -> Result<LocalNode, TreeError>;

    async fn get_children(&self, id: &str) -> Result<Vec<LocalNode>, TreeError>;

    /// Creates a node under `parent_id`. A `url` of `None` creates a folder.
    async fn create(
        &self,
        parent_id: &str,
        title: &str,
        url: Option<&str>,
    ) -> Result<LocalNode, TreeError>;

    async fn update_title(&self, id: &str, title: &str) -> Result<LocalNode, TreeError>;

    async fn move_node(&self, id: &str, new_parent_id: &str) -> Result<LocalNode, TreeError>;

    async fn remove(&self, id: &str) -> Result<(), TreeError>;

    /// Returns every node in the tree, root included, in no particular order.
    async fn full_tree(&self) -> Result<Vec<LocalNode>, TreeError>;

    /// Id of the tree root.
    fn root_id(&self) -> String;

    /// Folder that receives nodes with no better placement (the host's
    /// "unsorted" container). Children may not be created directly under
    /// the root.
    fn default_parent_id(&self) -> String;
}

/// Computes a node's folder path by walking ancestors through the adapter:
/// folder titles root-first, excluding the root and reserved containers.
pub async fn node_folder_path(
    tree: &dyn LocalTreeAdapter,
    node: &LocalNode,
) -> Result<Vec<String>, TreeError> {
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = node.parent_id.clone();

    while let Some(id) = cursor {
        if id == tree.root_id() || !seen.insert(id.clone()) {
            break;
        }
        let ancestor = tree.get(&id).await?;
        if ancestor.parent_id.is_some() && !is_reserved_folder(&ancestor.title) {
            path.push(ancestor.title.clone());
        }
        cursor = ancestor.parent_id;
    }

    path.reverse();
    Ok(path)
}

struct TreeState {
    nodes: HashMap<String, LocalNode>,
    children: HashMap<String, Vec<String>>,
}

impl TreeState {
    fn detach(&mut self, id: &str) {
        if let Some(node) = self.nodes.get(id)
            && let Some(parent) = &node.parent_id
            && let Some(siblings) = self.children.get_mut(parent)
        {
            siblings.retain(|c| c != id);
        }
    }
}

/// In-memory implementation of [`LocalTreeAdapter`].
///
/// Mirrors the host tree's shape: a root node with permanent containers
/// ("Bookmarks Bar", "Other Bookmarks") under it. Used by the test suites
/// and by headless runs; with an event sender attached, mutations emit the
/// same [`TreeEvent`]s a host subscription would.
pub struct MemoryTreeAdapter {
    state: Arc<Mutex<TreeState>>,
    events: Option<mpsc::Sender<TreeEvent>>,
    root: String,
    default_parent: String,
}

impl MemoryTreeAdapter {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// An adapter that emits mutation events to `events`, the way a host
    /// subscription would.
    pub fn with_events(events: mpsc::Sender<TreeEvent>) -> Self {
        Self::build(Some(events))
    }

    fn build(events: Option<mpsc::Sender<TreeEvent>>) -> Self {
        let mut nodes = HashMap::new();
        let mut children = HashMap::new();

        let root = "root".to_string();
        nodes.insert(
            root.clone(),
            LocalNode {
                id: root.clone(),
                title: String::new(),
                url: None,
                parent_id: None,
            },
        );

        let mut top = |id: &str, title: &str| {
            nodes.insert(
                id.to_string(),
                LocalNode {
                    id: id.to_string(),
                    title: title.to_string(),
                    url: None,
                    parent_id: Some(root.clone()),
                },
            );
            children.entry(root.clone()).or_insert_with(Vec::new).push(id.to_string());
        };
        top("bar", "Bookmarks Bar");
        top("unsorted", "Other Bookmarks");

        Self {
            state: Arc::new(Mutex::new(TreeState { nodes, children })),
            events,
            root,
            default_parent: "unsorted".to_string(),
        }
    }

    async fn emit(&self, event: TreeEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver just means nobody is listening anymore.
            let _ = tx.send(event).await;
        }
    }
}

impl Default for MemoryTreeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalTreeAdapter for MemoryTreeAdapter {
    async fn get(&self, id: &str) -> Result<LocalNode, TreeError> {
        let state = self.state.lock().await;
        state
            .nodes
            .get(id)
            .cloned()
            .ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    async fn get_children(&self, id: &str) -> Result<Vec<LocalNode>, TreeError> {
        let state = self.state.lock().await;
        if !state.nodes.contains_key(id) {
            return Err(TreeError::NotFound(id.to_string()));
        }
        let ids = state.children.get(id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|c| state.nodes.get(c).cloned())
            .collect())
    }

    async fn create(
        &self,
        parent_id: &str,
        title: &str,
        url: Option<&str>,
    ) -> Result<LocalNode, TreeError> {
        let node = {
            let mut state = self.state.lock().await;
            if !state.nodes.contains_key(parent_id) {
                return Err(TreeError::NotFound(parent_id.to_string()));
            }
            let id = uuid::Uuid::new_v4().to_string();
            let node = LocalNode {
                id: id.clone(),
                title: title.to_string(),
                url: url.map(str::to_string),
                parent_id: Some(parent_id.to_string()),
            };
            state.nodes.insert(id.clone(), node.clone());
            state
                .children
                .entry(parent_id.to_string())
                .or_default()
                .push(id);
            node
        };
        debug!("memory tree: created {} under {parent_id}", node.id);
        self.emit(TreeEvent::Created(node.clone())).await;
        Ok(node)
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<LocalNode, TreeError> {
        let node = {
            let mut state = self.state.lock().await;
            let node = state
                .nodes
                .get_mut(id)
                .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
            node.title = title.to_string();
            node.clone()
        };
        self.emit(TreeEvent::Changed(node.clone())).await;
        Ok(node)
    }

    async fn move_node(&self, id: &str, new_parent_id: &str) -> Result<LocalNode, TreeError> {
        let node = {
            let mut state = self.state.lock().await;
            if !state.nodes.contains_key(new_parent_id) {
                return Err(TreeError::NotFound(new_parent_id.to_string()));
            }
            if !state.nodes.contains_key(id) {
                return Err(TreeError::NotFound(id.to_string()));
            }
            state.detach(id);
            state
                .children
                .entry(new_parent_id.to_string())
                .or_default()
                .push(id.to_string());
            let node = state
                .nodes
                .get_mut(id)
                .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
            node.parent_id = Some(new_parent_id.to_string());
            node.clone()
        };
        self.emit(TreeEvent::Moved(node.clone())).await;
        Ok(node)
    }

    async fn remove(&self, id: &str) -> Result<(), TreeError> {
        {
            let mut state = self.state.lock().await;
            if !state.nodes.contains_key(id) {
                return Err(TreeError::NotFound(id.to_string()));
            }
            state.detach(id);
            state.nodes.remove(id);
            state.children.remove(id);
        }
        self.emit(TreeEvent::Removed { id: id.to_string() }).await;
        Ok(())
    }

    async fn full_tree(&self) -> Result<Vec<LocalNode>, TreeError> {
        let state = self.state.lock().await;
        Ok(state.nodes.values().cloned().collect())
    }

    fn root_id(&self) -> String {
        self.root.clone()
    }

    fn default_parent_id(&self) -> String {
        self.default_parent.clone()
    }
}
