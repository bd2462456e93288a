//! Markhub wire types.
//!
//! Shapes match the Markhub REST API. List endpoints wrap their arrays in a
//! named field; the export endpoint returns folders and bookmarks with
//! precomputed paths so clients never have to reconstruct ancestry from ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A folder record in the Markhub store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// A bookmark record in the Markhub store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteBookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub folder_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// A folder entry in the bulk export, with its path precomputed server-side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedFolder {
    pub id: String,
    pub name: String,
    pub path: Vec<String>,
}

/// A bookmark entry in the bulk export, with its containing folder path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedBookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub folder_path: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Full remote state returned by `GET /api/export`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteExport {
    pub folders: Vec<ExportedFolder>,
    pub bookmarks: Vec<ExportedBookmark>,
}
