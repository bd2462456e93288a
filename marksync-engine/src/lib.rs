//! Bidirectional reconciliation engine for marksync.
//!
//! Keeps the host's native bookmark tree consistent with the Markhub remote
//! store:
//! - **Forward sync**: local mutation events propagate to Markhub as
//!   URL-keyed upserts and deletes.
//! - **Reverse sync**: a one-shot pass pulls the remote export and creates/
//!   updates the minimum set of local nodes, matching folders by path and
//!   bookmarks by URL.
//! - **Recommendation workflow**: an optional AI scorer suggests a folder
//!   for each newly created bookmark before it is synced; accept moves the
//!   bookmark (the move event performs the one remote upsert), dismiss
//!   syncs it unmodified.
//!
//! The hosting process is ephemeral: every component here survives a
//! teardown/respawn because nothing depends on in-memory state beyond
//! best-effort caches, and [`service::SyncService::initialize`] rehydrates
//! from durable settings alone.

pub mod error;
pub mod forward;
pub mod local_resolver;
pub mod local_tree;
pub mod messages;
pub mod recommend;
pub mod reverse;
pub mod service;
pub mod settings;

pub use error::{EngineError, EngineResult};
pub use forward::ForwardSyncEngine;
pub use local_resolver::{LocalPathResolver, LocalResolution};
pub use local_tree::{LocalTreeAdapter, MemoryTreeAdapter, TreeError};
pub use messages::{ChannelUnavailable, MessageAck, NullUiChannel, UiChannel, UiCommand, UiMessage};
pub use recommend::{
    AUTO_ACCEPT_CONFIDENCE, FolderScorer, FolderSuggestion, PendingRecommendation,
    RecommendationState, RecommendationWorkflow,
};
pub use reverse::ReverseSyncManager;
pub use service::{ServiceCommand, ServiceHandle, SyncService, create_sync_service};
pub use settings::{SettingsStore, StaticSettings, SyncSettings};
