//! Reconciles provider file uploads with persisted records.
//!
//! The upload-then-record sequence is not transactional; the only rollback
//! is a compensating remote delete when the record insert fails.

use std::sync::Arc;

use pravo_gigachat::FileStore;

use crate::error::{Result, StoreError};
use crate::sqlite::{FileRecord, SqliteStore};

pub struct PersistenceBridge {
    files: Arc<FileStore>,
    store: SqliteStore,
}

impl PersistenceBridge {
    #[must_use]
    pub fn new(files: Arc<FileStore>, store: SqliteStore) -> Self {
        Self { files, store }
    }

    /// Upload bytes to the provider, then persist a record referencing the
    /// remote file id.
    ///
    /// `file_size` is the size of the original uploaded document, which may
    /// differ from `bytes` when the stored payload is processed text.
    ///
    /// # Errors
    ///
    /// Propagates upload failures. On record-insert failure the remote file
    /// is deleted again and the insert failure surfaces; if that cleanup
    /// also fails, both failures are reported and the remote orphan is
    /// logged.
    pub async fn upload_and_record(
        &self,
        bytes: &[u8],
        name: &str,
        file_size: i64,
    ) -> Result<FileRecord> {
        let remote = self.files.upload(bytes, name).await?;
        let record = FileRecord::new(name, file_size, remote.id.clone());

        if let Err(persist) = self.store.insert_record(&record).await {
            tracing::error!(name, error = %persist, "record insert failed, deleting remote file");
            return match self.files.delete(&remote.id).await {
                Ok(()) => Err(persist),
                Err(cleanup) => {
                    tracing::error!(
                        remote_id = %remote.id,
                        error = %cleanup,
                        "compensating delete failed, remote file orphaned"
                    );
                    Err(StoreError::CompensationFailed {
                        persist: Box::new(persist),
                        cleanup,
                    })
                }
            };
        }

        tracing::info!(id = %record.id, remote_id = %record.gigachat_file_id, "document recorded");
        Ok(record)
    }

    /// Resolve a persisted record to its remote file id, verifying the
    /// remote file still exists.
    ///
    /// The cached listing may be stale, so a miss triggers one forced
    /// refresh before the reference is declared dangling.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no record matches, or
    /// `StoreError::DanglingReference` if the remote file is gone.
    pub async fn resolve_remote_id(&self, local_id: &str) -> Result<String> {
        let record = self
            .store
            .get_record(local_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(local_id.to_owned()))?;

        let remote_id = record.gigachat_file_id;
        if self.files.find_by_id(&remote_id).await?.is_some() {
            return Ok(remote_id);
        }

        let refreshed = self.files.list(true).await?;
        if refreshed.iter().any(|f| f.id == remote_id) {
            return Ok(remote_id);
        }
        Err(StoreError::DanglingReference(remote_id))
    }

    /// Delete a persisted record and attempt to delete its remote file.
    ///
    /// Remote-delete failure is logged and tolerated so the local catalog
    /// stays consistent even when the provider is unreachable.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no record matches; database failures
    /// propagate.
    pub async fn delete_record_and_remote(&self, local_id: &str) -> Result<FileRecord> {
        let record = self
            .store
            .get_record(local_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(local_id.to_owned()))?;

        self.store.delete_record(local_id).await?;

        if let Err(e) = self.files.delete(&record.gigachat_file_id).await {
            tracing::warn!(
                remote_id = %record.gigachat_file_id,
                error = %e,
                "remote delete failed, record removed anyway"
            );
        }
        Ok(record)
    }
}
