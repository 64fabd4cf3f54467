//! GigaChat provider integration: OAuth token exchange, file API,
//! cached file store and chat orchestration.

pub mod api;
pub mod auth;
pub mod chat;
pub mod client;
pub mod error;
pub mod files;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use api::{ChatApi, ChatMessage, ChatRequest, FileApi, RemoteFile, Role};
pub use chat::{ChatOrchestrator, NO_ANSWER};
pub use client::GigaChatClient;
pub use error::GigaChatError;
pub use files::{DeleteOutcome, FileStore};
