//! Wire types and trait seams for the GigaChat file and chat APIs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A file hosted in the provider's per-account store.
///
/// Owned by the remote side; this is a read-through view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub filename: String,
    #[serde(rename = "bytes")]
    pub size: u64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub purpose: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileListResponse {
    pub data: Vec<RemoteFile>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssistantMessage {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: AssistantMessage,
}

/// The two response shapes GigaChat is known to produce: a list of
/// alternative completions, or a bare message.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawChatResponse {
    Completions { choices: Vec<Choice> },
    Single { message: AssistantMessage },
}

/// Collapse a raw provider response into at most one answer string.
///
/// Shape handling lives here and nowhere else; a response matching neither
/// shape yields `None` rather than an error, so callers can fall back to a
/// sentinel answer.
#[must_use]
pub(crate) fn normalize_chat_response(value: serde_json::Value) -> Option<String> {
    match serde_json::from_value::<RawChatResponse>(value) {
        Ok(RawChatResponse::Completions { choices }) => {
            choices.into_iter().next().map(|c| c.message.content)
        }
        Ok(RawChatResponse::Single { message }) => Some(message.content),
        Err(_) => None,
    }
}

/// Provider file operations, the seam mocked in tests.
#[async_trait]
pub trait FileApi: Send + Sync {
    async fn list_files(&self) -> Result<Vec<RemoteFile>>;

    async fn upload_file(&self, bytes: &[u8], filename: &str) -> Result<RemoteFile>;

    async fn delete_file(&self, id: &str) -> Result<()>;
}

/// Chat completion, already normalized: `None` means the provider answered
/// without usable content.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completions_shape_takes_first_choice() {
        let value = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        });
        assert_eq!(normalize_chat_response(value), Some("first".to_owned()));
    }

    #[test]
    fn single_message_shape_is_accepted() {
        let value = json!({"message": {"content": "直接 answer"}});
        assert_eq!(normalize_chat_response(value), Some("直接 answer".to_owned()));
    }

    #[test]
    fn empty_choices_yield_no_answer() {
        let value = json!({"choices": []});
        assert_eq!(normalize_chat_response(value), None);
    }

    #[test]
    fn unknown_shape_yields_no_answer() {
        let value = json!({"status": "queued"});
        assert_eq!(normalize_chat_response(value), None);
    }

    #[test]
    fn remote_file_parses_provider_field_names() {
        let file: RemoteFile = serde_json::from_value(json!({
            "id": "f-1",
            "filename": "44FZ.txt",
            "bytes": 1204,
            "created_at": 1_760_637_786,
            "purpose": "general"
        }))
        .unwrap();
        assert_eq!(file.size, 1204);
        assert_eq!(file.filename, "44FZ.txt");
    }

    #[test]
    fn chat_request_omits_empty_attachments() {
        let request = ChatRequest {
            model: "GigaChat".into(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: "hi".into(),
                attachments: Vec::new(),
            }],
            temperature: Some(0.1),
            max_tokens: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("attachments"));
        assert!(!json.contains("max_tokens"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
