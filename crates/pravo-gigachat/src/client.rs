use serde::Deserialize;

use crate::api::{ChatApi, ChatRequest, FileApi, FileListResponse, RemoteFile, normalize_chat_response};
use crate::auth::TokenManager;
use crate::error::{GigaChatError, Result};
use crate::http::default_client;

pub const DEFAULT_BASE_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
pub const DEFAULT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";
pub const DEFAULT_MODEL: &str = "GigaChat";

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceItem {
    pub usage: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: Vec<BalanceItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// HTTP client for the GigaChat chat and file APIs.
pub struct GigaChatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    auth: TokenManager,
}

impl std::fmt::Debug for GigaChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GigaChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl GigaChatClient {
    #[must_use]
    pub fn new(credentials: impl Into<String>, scope: impl Into<String>) -> Self {
        let http = default_client();
        Self {
            auth: TokenManager::new(DEFAULT_AUTH_URL, credentials, scope, http.clone()),
            http,
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth.set_auth_url(url);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Current account balance per usage category.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn get_balance(&self) -> Result<Vec<BalanceItem>> {
        let token = self.auth.token().await?;
        let response = self
            .http
            .get(format!("{}/balance", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GigaChatError::Unavailable(e.to_string()))?;

        let text = check_status(response, "balance").await?;
        let parsed: BalanceResponse = serde_json::from_str(&text)?;
        Ok(parsed.balance)
    }
}

/// Read the body and translate non-success statuses into typed errors.
async fn check_status(response: reqwest::Response, operation: &str) -> Result<String> {
    let status = response.status();
    let text = response.text().await.map_err(GigaChatError::Http)?;

    if status.is_success() {
        return Ok(text);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(GigaChatError::NotFound(operation.to_owned()));
    }

    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|b| b.message)
        .unwrap_or_default();
    tracing::error!("GigaChat {operation} failed with status {status}: {message}");
    Err(GigaChatError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl FileApi for GigaChatClient {
    async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        let token = self.auth.token().await?;
        let response = self
            .http
            .get(format!("{}/files", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GigaChatError::Unavailable(e.to_string()))?;

        let text = check_status(response, "list files").await?;
        let parsed: FileListResponse = serde_json::from_str(&text)?;
        Ok(parsed.data)
    }

    async fn upload_file(&self, bytes: &[u8], filename: &str) -> Result<RemoteFile> {
        let token = self.auth.token().await?;
        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.to_owned())
            .mime_str("text/plain")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("purpose", "general");

        let response = self
            .http
            .post(format!("{}/files", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GigaChatError::Unavailable(e.to_string()))?;

        let text = check_status(response, "upload file").await?;
        let file: RemoteFile = serde_json::from_str(&text)
            .map_err(|e| GigaChatError::UploadFailed(format!("unexpected response: {e}")))?;
        tracing::info!(id = %file.id, filename, "file uploaded to GigaChat");
        Ok(file)
    }

    async fn delete_file(&self, id: &str) -> Result<()> {
        let token = self.auth.token().await?;
        let response = self
            .http
            .post(format!("{}/files/{id}/delete", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GigaChatError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GigaChatError::NotFound(id.to_owned()));
        }
        check_status(response, "delete file").await?;
        tracing::info!(id, "file deleted from GigaChat");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatApi for GigaChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<Option<String>> {
        let token = self.auth.token().await?;
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| GigaChatError::Unavailable(e.to_string()))?;

        let text = check_status(response, "chat completion").await?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        Ok(normalize_chat_response(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatMessage, Role};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_auth(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-token",
                "expires_at": i64::MAX
            })))
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> GigaChatClient {
        GigaChatClient::new("Y3JlZA==", DEFAULT_SCOPE)
            .with_base_url(server.uri())
            .with_auth_url(format!("{}/oauth", server.uri()))
    }

    #[tokio::test]
    async fn list_files_parses_data_array() {
        let server = MockServer::start().await;
        mock_auth(&server).await;
        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "f-1", "filename": "a.txt", "bytes": 10, "created_at": 1, "purpose": "general"},
                    {"id": "f-2", "filename": "b.txt", "bytes": 20, "created_at": 2, "purpose": "general"}
                ]
            })))
            .mount(&server)
            .await;

        let files = client(&server).list_files().await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, "f-1");
        assert_eq!(files[1].size, 20);
    }

    #[tokio::test]
    async fn upload_sends_multipart_and_parses_file() {
        let server = MockServer::start().await;
        mock_auth(&server).await;
        Mock::given(method("POST"))
            .and(path("/files"))
            .and(body_string_contains("purpose"))
            .and(body_string_contains("44FZ.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "f-new", "filename": "44FZ.txt", "bytes": 5, "created_at": 3, "purpose": "general"
            })))
            .mount(&server)
            .await;

        let file = client(&server)
            .upload_file(b"hello", "44FZ.txt")
            .await
            .unwrap();
        assert_eq!(file.id, "f-new");
    }

    #[tokio::test]
    async fn delete_missing_file_is_not_found() {
        let server = MockServer::start().await;
        mock_auth(&server).await;
        Mock::given(method("POST"))
            .and(path("/files/f-gone/delete"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).delete_file("f-gone").await.unwrap_err();
        assert!(matches!(err, GigaChatError::NotFound(id) if id == "f-gone"));
    }

    #[tokio::test]
    async fn chat_normalizes_completions_shape() {
        let server = MockServer::start().await;
        mock_auth(&server).await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "консультация"}}]
            })))
            .mount(&server)
            .await;

        let request = ChatRequest {
            model: DEFAULT_MODEL.into(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: "вопрос".into(),
                attachments: vec!["f-1".into()],
            }],
            temperature: Some(0.7),
            max_tokens: Some(600),
        };
        let answer = client(&server).chat(request).await.unwrap();
        assert_eq!(answer.as_deref(), Some("консультация"));
    }

    #[tokio::test]
    async fn server_error_surfaces_status_and_message() {
        let server = MockServer::start().await;
        mock_auth(&server).await;
        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "internal"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).list_files().await.unwrap_err();
        assert!(matches!(err, GigaChatError::Api { status: 500, message } if message == "internal"));
    }

    #[tokio::test]
    async fn balance_parses_usage_items() {
        let server = MockServer::start().await;
        mock_auth(&server).await;
        Mock::given(method("GET"))
            .and(path("/balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "balance": [{"usage": "GigaChat", "value": 19_763.0}]
            })))
            .mount(&server)
            .await;

        let balance = client(&server).get_balance().await.unwrap();
        assert_eq!(balance.len(), 1);
        assert_eq!(balance[0].usage, "GigaChat");
    }
}
