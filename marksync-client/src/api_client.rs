//! HTTP client for the Markhub bookmark service.
//!
//! Handles the bearer-token lifecycle, folder and bookmark CRUD, the bulk
//! export, and single-flight deduplication of folder creation. Uses reqwest
//! with JSON serialization. The token itself is owned by the host's settings
//! module; this client only holds it for the current process lifetime.

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::folder_cache::FolderCache;
use crate::path_resolver::folder_key;
use crate::single_flight::SingleFlight;
use marksync_types::{RemoteBookmark, RemoteExport, RemoteFolder};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// HTTP client for the Markhub API.
///
/// Cheap to clone — all state is behind `Arc`s, and clones share the token,
/// the folder cache, and the creation-lock table.
#[derive(Clone)]
pub struct RemoteStoreClient {
    client: Client,
    pub(crate) config: RemoteConfig,
    token: Arc<RwLock<Option<String>>>,
    pub(crate) folders: Arc<FolderCache>,
    create_locks: Arc<SingleFlight<(RemoteFolder, bool), RemoteError>>,
}

impl RemoteStoreClient {
    pub fn new(config: RemoteConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        let folders = Arc::new(FolderCache::new(Duration::from_secs(
            config.folder_cache_ttl_secs,
        )));

        Self {
            client,
            config,
            token: Arc::new(RwLock::new(None)),
            folders,
            create_locks: Arc::new(SingleFlight::new()),
        }
    }

    // ── Token lifecycle ──

    /// Installs the bearer token (restored from the host's settings).
    pub async fn set_token(&self, token: String) {
        let mut t = self.token.write().await;
        *t = Some(token);
    }

    /// Drops the token and everything derived from an authenticated session.
    pub async fn clear_token(&self) {
        let mut t = self.token.write().await;
        *t = None;
        drop(t);
        self.folders.invalidate().await;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn bearer(&self) -> RemoteResult<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or(RemoteError::AuthRequired)
    }

    // ── Request plumbing ──

    async fn auth_get(&self, path: &str) -> RemoteResult<reqwest::Response> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let token = self.bearer().await?;
        Ok(self.client.get(&url).bearer_auth(&token).send().await?)
    }

    async fn auth_post(&self, path: &str, body: &impl Serialize) -> RemoteResult<reqwest::Response> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let token = self.bearer().await?;
        Ok(self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?)
    }

    async fn auth_patch(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> RemoteResult<reqwest::Response> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let token = self.bearer().await?;
        Ok(self
            .client
            .patch(&url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?)
    }

    async fn auth_delete(&self, path: &str) -> RemoteResult<reqwest::Response> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let token = self.bearer().await?;
        Ok(self.client.delete(&url).bearer_auth(&token).send().await?)
    }

    /// Maps error statuses into the taxonomy. A 401/403 invalidates the
    /// stored token and the folder cache — the session is gone, and stale
    /// folder ids from it must not be reused.
    async fn check(&self, resp: reqwest::Response, ctx: &str) -> RemoteResult<reqwest::Response> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("{ctx}: HTTP {status}, re-authentication required");
            self.clear_token().await;
            return Err(RemoteError::AuthRequired);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(ctx.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Api(format!("{ctx}: HTTP {status} {body}")));
        }
        Ok(resp)
    }

    // ── Folders ──

    /// Fetches the full folder list and refreshes the cache.
    pub async fn list_folders(&self) -> RemoteResult<Vec<RemoteFolder>> {
        let resp = self.auth_get("/api/folders").await?;
        let resp = self.check(resp, "list folders").await?;

        #[derive(Deserialize)]
        struct Resp {
            folders: Vec<RemoteFolder>,
        }
        let data: Resp = resp.json().await?;
        self.folders.fill(data.folders.clone()).await;
        Ok(data.folders)
    }

    /// Returns the folder `(name, parent_id)`, creating it if missing.
    ///
    /// Concurrent callers for the same `name:parent` key share one create
    /// call through the creation-lock table; the boolean reports whether the
    /// shared flight actually created the folder.
    pub async fn ensure_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> RemoteResult<(RemoteFolder, bool)> {
        if let Some(existing) = self.folders.lookup(name, parent_id).await {
            return Ok((existing, false));
        }

        let key = folder_key(name, parent_id);
        let this = self.clone();
        let name = name.to_string();
        let parent = parent_id.map(str::to_string);

        self.create_locks
            .run(&key, move || async move {
                this.create_folder(&name, parent.as_deref()).await
            })
            .await
            .map_err(RemoteError::from)
    }

    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> RemoteResult<(RemoteFolder, bool)> {
        let resp = self
            .auth_post(
                "/api/folders",
                &serde_json::json!({ "name": name, "parent_id": parent_id }),
            )
            .await?;

        // 409 Conflict = another client (or an earlier process) created it —
        // adopt the existing folder instead of failing.
        if resp.status() == StatusCode::CONFLICT {
            debug!("folder '{name}' already exists under {parent_id:?}, adopting");
            let listed = self.list_folders().await?;
            return listed
                .into_iter()
                .find(|f| f.name == name && f.parent_id.as_deref() == parent_id)
                .map(|f| (f, false))
                .ok_or_else(|| {
                    RemoteError::Api("folder create conflict but not present in list".to_string())
                });
        }

        let resp = self.check(resp, "create folder").await?;
        let folder: RemoteFolder = resp.json().await?;
        self.folders.insert(folder.clone()).await;
        Ok((folder, true))
    }

    // ── Bookmarks ──

    /// Finds a bookmark by exact URL. URL is the cross-store identity for
    /// bookmarks, so this is the lookup every upsert goes through.
    pub async fn find_bookmark_by_url(&self, url: &str) -> RemoteResult<Option<RemoteBookmark>> {
        let resp = self
            .auth_get(&format!("/api/bookmarks?url={}", urlencoding::encode(url)))
            .await?;
        let resp = self.check(resp, "find bookmark").await?;

        #[derive(Deserialize)]
        struct Resp {
            bookmarks: Vec<RemoteBookmark>,
        }
        let data: Resp = resp.json().await?;
        Ok(data.bookmarks.into_iter().find(|b| b.url == url))
    }

    pub async fn create_bookmark(
        &self,
        title: &str,
        url: &str,
        folder_id: Option<&str>,
    ) -> RemoteResult<RemoteBookmark> {
        let resp = self
            .auth_post(
                "/api/bookmarks",
                &serde_json::json!({ "title": title, "url": url, "folder_id": folder_id }),
            )
            .await?;
        let resp = self.check(resp, "create bookmark").await?;
        Ok(resp.json().await?)
    }

    pub async fn update_bookmark(
        &self,
        id: &str,
        title: &str,
        folder_id: Option<&str>,
    ) -> RemoteResult<RemoteBookmark> {
        let resp = self
            .auth_patch(
                &format!("/api/bookmarks/{id}"),
                &serde_json::json!({ "title": title, "folder_id": folder_id }),
            )
            .await?;
        let resp = self.check(resp, "update bookmark").await?;
        Ok(resp.json().await?)
    }

    /// Deletes a bookmark. A 404 is treated as success — the record is gone
    /// either way.
    pub async fn delete_bookmark(&self, id: &str) -> RemoteResult<()> {
        let resp = self.auth_delete(&format!("/api/bookmarks/{id}")).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!("bookmark {id} already deleted remotely");
            return Ok(());
        }
        self.check(resp, "delete bookmark").await?;
        Ok(())
    }

    /// Idempotent upsert keyed by URL: create if absent, else patch title
    /// and folder. The boolean reports whether a create happened.
    pub async fn upsert_bookmark(
        &self,
        title: &str,
        url: &str,
        folder_id: Option<&str>,
    ) -> RemoteResult<(RemoteBookmark, bool)> {
        match self.find_bookmark_by_url(url).await? {
            Some(existing) => {
                let updated = self.update_bookmark(&existing.id, title, folder_id).await?;
                Ok((updated, false))
            }
            None => {
                let created = self.create_bookmark(title, url, folder_id).await?;
                Ok((created, true))
            }
        }
    }

    // ── Export ──

    /// Fetches the full remote state with precomputed folder paths.
    pub async fn export(&self) -> RemoteResult<RemoteExport> {
        let resp = self.auth_get("/api/export").await?;
        let resp = self.check(resp, "export").await?;
        Ok(resp.json().await?)
    }

    // ── Path ensure (optional endpoint) ──

    /// Resolves a whole folder path server-side in one call. Servers that
    /// don't implement the endpoint answer 404/405, surfaced as `NotFound`
    /// so the caller can fall back to the client-driven walk.
    pub async fn ensure_folder_path_remote(
        &self,
        path: &[String],
    ) -> RemoteResult<crate::path_resolver::PathResolution> {
        let resp = self
            .auth_post(
                "/api/folders/ensure-path",
                &serde_json::json!({ "path": path }),
            )
            .await?;

        if resp.status() == StatusCode::METHOD_NOT_ALLOWED {
            return Err(RemoteError::NotFound(
                "ensure-path endpoint not supported".to_string(),
            ));
        }
        let resp = self.check(resp, "ensure folder path").await?;

        #[derive(Deserialize)]
        struct Resp {
            folder_id: String,
            #[serde(default)]
            created: Vec<String>,
        }
        let data: Resp = resp.json().await?;
        Ok(crate::path_resolver::PathResolution {
            folder_id: Some(data.folder_id),
            created: data.created,
        })
    }
}
