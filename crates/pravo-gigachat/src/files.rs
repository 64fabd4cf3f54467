//! Cached view of the provider's uploaded-file catalog.
//!
//! The cache is all-or-nothing: either a full listing as returned by the
//! provider, or absent. Every mutating operation invalidates it wholesale;
//! correctness over cache-hit-rate.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::api::{FileApi, RemoteFile};
use crate::error::{GigaChatError, Result};

/// Per-item result of a bulk delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct FileStore {
    api: Arc<dyn FileApi>,
    cache: RwLock<Option<Vec<RemoteFile>>>,
}

impl FileStore {
    #[must_use]
    pub fn new(api: Arc<dyn FileApi>) -> Self {
        Self {
            api,
            cache: RwLock::new(None),
        }
    }

    /// The current file listing.
    ///
    /// Serves from cache unless it is absent or `force_refresh` is set, in
    /// which case exactly one remote fetch replaces the cache atomically.
    ///
    /// # Errors
    ///
    /// Propagates remote listing failures; the cache stays untouched then.
    pub async fn list(&self, force_refresh: bool) -> Result<Vec<RemoteFile>> {
        if !force_refresh
            && let Some(cached) = self.cache.read().await.as_ref()
        {
            return Ok(cached.clone());
        }

        let files = self.api.list_files().await?;
        *self.cache.write().await = Some(files.clone());
        tracing::debug!(count = files.len(), "file listing refreshed");
        Ok(files)
    }

    /// Remote ids of all currently listed files.
    ///
    /// # Errors
    ///
    /// Propagates remote listing failures.
    pub async fn ids(&self) -> Result<Vec<String>> {
        Ok(self.list(false).await?.into_iter().map(|f| f.id).collect())
    }

    /// First file matching `name` exactly, case-sensitively.
    ///
    /// # Errors
    ///
    /// Propagates remote listing failures.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<RemoteFile>> {
        Ok(self
            .list(false)
            .await?
            .into_iter()
            .find(|f| f.filename == name))
    }

    /// # Errors
    ///
    /// Propagates remote listing failures.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<RemoteFile>> {
        Ok(self.list(false).await?.into_iter().find(|f| f.id == id))
    }

    /// Upload bytes as a provider-hosted file.
    ///
    /// Invalidates the cache instead of appending: a concurrent reader must
    /// never see a locally fabricated entry that could diverge from the
    /// provider's canonical record.
    ///
    /// # Errors
    ///
    /// Propagates remote upload failures.
    pub async fn upload(&self, bytes: &[u8], filename: &str) -> Result<RemoteFile> {
        let file = self.api.upload_file(bytes, filename).await?;
        self.invalidate().await;
        Ok(file)
    }

    /// Delete a remote file by id.
    ///
    /// The cache is invalidated even when the remote call fails: a reported
    /// `NotFound` means the cached listing was already stale.
    ///
    /// # Errors
    ///
    /// Returns `GigaChatError::NotFound` if the provider has no such id.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.api.delete_file(id).await;
        self.invalidate().await;
        result
    }

    /// Resolve `name` to an id and delete that file, returning the id.
    ///
    /// # Errors
    ///
    /// Returns `GigaChatError::NotFound` if no file carries that name.
    pub async fn delete_by_name(&self, name: &str) -> Result<String> {
        let file = self
            .find_by_name(name)
            .await?
            .ok_or_else(|| GigaChatError::NotFound(name.to_owned()))?;
        self.delete(&file.id).await?;
        Ok(file.id)
    }

    /// Delete every listed file, capturing per-item outcomes.
    ///
    /// One failing delete does not abort the rest.
    ///
    /// # Errors
    ///
    /// Fails only if the initial listing cannot be obtained.
    pub async fn delete_all(&self) -> Result<Vec<DeleteOutcome>> {
        let files = self.list(false).await?;
        let mut outcomes = Vec::with_capacity(files.len());

        for file in files {
            match self.api.delete_file(&file.id).await {
                Ok(()) => outcomes.push(DeleteOutcome {
                    id: file.id,
                    ok: true,
                    error: None,
                }),
                Err(e) => {
                    tracing::warn!(id = %file.id, error = %e, "bulk delete item failed");
                    outcomes.push(DeleteOutcome {
                        id: file.id,
                        ok: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        self.invalidate().await;
        Ok(outcomes)
    }

    /// Discard the cached listing; the next read fetches fresh.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}
