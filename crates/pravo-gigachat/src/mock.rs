//! Test-only mock implementations of the provider APIs.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::api::{ChatApi, ChatRequest, FileApi, RemoteFile};
use crate::error::{GigaChatError, Result};

/// In-memory stand-in for the provider file store, with call counters for
/// cache behavior assertions.
#[derive(Default)]
pub struct MockFileApi {
    files: Mutex<Vec<RemoteFile>>,
    list_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_delete: Mutex<HashSet<String>>,
    next_id: AtomicUsize,
}

impl MockFileApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_files(names: &[&str]) -> Self {
        let api = Self::default();
        {
            let mut files = api.files.lock().unwrap();
            for name in names {
                let id = api.next_id.fetch_add(1, Ordering::SeqCst);
                files.push(RemoteFile {
                    id: format!("f-{id}"),
                    filename: (*name).to_owned(),
                    size: 100,
                    created_at: 0,
                    purpose: "general".to_owned(),
                });
            }
        }
        api
    }

    /// Make deleting `id` fail with a synthetic API error.
    pub fn fail_delete(&self, id: &str) {
        self.fail_delete.lock().unwrap().insert(id.to_owned());
    }

    /// Drop a file provider-side without going through the API, simulating
    /// remote eviction behind the cache's back.
    pub fn evict(&self, id: &str) {
        self.files.lock().unwrap().retain(|f| f.id != id);
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn remote_filenames(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.filename.clone())
            .collect()
    }
}

#[async_trait]
impl FileApi for MockFileApi {
    async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.files.lock().unwrap().clone())
    }

    async fn upload_file(&self, bytes: &[u8], filename: &str) -> Result<RemoteFile> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let file = RemoteFile {
            id: format!("f-{id}"),
            filename: filename.to_owned(),
            size: bytes.len() as u64,
            created_at: 0,
            purpose: "general".to_owned(),
        };
        self.files.lock().unwrap().push(file.clone());
        Ok(file)
    }

    async fn delete_file(&self, id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.lock().unwrap().contains(id) {
            return Err(GigaChatError::Api {
                status: 500,
                message: "mock delete failure".to_owned(),
            });
        }
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.id != id);
        if files.len() == before {
            return Err(GigaChatError::NotFound(id.to_owned()));
        }
        Ok(())
    }
}

/// Scripted chat responses: one entry consumed per request, `None` plays a
/// contentless provider answer.
#[derive(Default)]
pub struct MockChatApi {
    responses: Mutex<Vec<Result<Option<String>>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatApi {
    #[must_use]
    pub fn with_responses(responses: Vec<Result<Option<String>>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Attachments carried by each request seen so far.
    #[must_use]
    pub fn seen_attachments(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| {
                r.messages
                    .iter()
                    .flat_map(|m| m.attachments.clone())
                    .collect()
            })
            .collect()
    }

    /// Message bodies carried by each request seen so far.
    #[must_use]
    pub fn seen_contents(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.messages.first().map(|m| m.content.clone()))
            .collect()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn chat(&self, request: ChatRequest) -> Result<Option<String>> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(Some("mock answer".to_owned()))
        } else {
            responses.remove(0)
        }
    }
}
