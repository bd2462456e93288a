//! Shared data model for marksync.
//!
//! Types that cross crate boundaries live here: the local tree node shape,
//! the Markhub wire types, and the report produced by a reverse-sync pass.
//! Identity rules are central to the whole system:
//! - bookmarks are matched across stores by **URL**, never by id
//! - folders are matched across stores by **path** (ancestor names from
//!   root, exclusive), never by id

mod local;
mod remote;
mod report;

pub use local::{LocalNode, TreeEvent, folder_path_of, is_reserved_folder};
pub use remote::{
    ExportedBookmark, ExportedFolder, RemoteBookmark, RemoteExport, RemoteFolder,
};
pub use report::SyncReport;
