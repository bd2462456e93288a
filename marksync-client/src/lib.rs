//! Markhub HTTP client for marksync.
//!
//! Provides the remote half of the sync engine:
//! - Bearer-token CRUD on folders and bookmarks, plus the bulk export
//! - A TTL cache of the remote folder list
//! - Single-flight deduplication of concurrent folder creations
//! - Folder-path resolution with create-if-missing semantics

pub mod api_client;
pub mod config;
pub mod error;
pub mod folder_cache;
pub mod path_resolver;
pub mod single_flight;

pub use api_client::RemoteStoreClient;
pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
pub use path_resolver::{PathResolution, folder_key};
pub use single_flight::SingleFlight;
