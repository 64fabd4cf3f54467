use std::path::Path;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use pravo_extract::{DocumentFormat, ExtractError};
use pravo_gigachat::DeleteOutcome;
use pravo_store::StoreError;

use crate::error::ApiError;
use crate::server::AppState;

pub(crate) const MAX_MESSAGE_CHARS: usize = 10_000;

#[derive(serde::Serialize)]
pub(crate) struct UploadResponse {
    pub id: String,
    pub filename: String,
    pub size: i64,
}

#[derive(serde::Serialize)]
pub(crate) struct FileSummary {
    id: String,
    filename: String,
    size: i64,
    created_at: String,
}

#[derive(serde::Serialize)]
pub(crate) struct DeleteResponse {
    deleted: String,
}

#[derive(serde::Deserialize)]
pub(crate) struct ChatPayload {
    pub message: String,
    #[serde(default)]
    pub attachment_id: Option<String>,
}

#[derive(serde::Serialize)]
pub(crate) struct ChatResponse {
    response: String,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

#[derive(serde::Serialize)]
pub(crate) struct MetricsResponse {
    uptime_secs: u64,
    record_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_file_count: Option<usize>,
}

/// Accept a multipart document, extract its text and record the upload.
///
/// The extracted text is what gets stored provider-side, under the original
/// name with a `.txt` extension; the reported size is the original payload's.
pub(crate) async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("unreadable multipart body: {e}")))?
        .ok_or_else(|| ApiError::bad_request("multipart body carries no file field"))?;

    let filename = field
        .file_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| ApiError::bad_request("file field has no filename"))?;
    let format = DocumentFormat::from_filename(&filename)?;

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("unreadable multipart body: {e}")))?;
    if bytes.len() > state.max_file_size {
        return Err(ExtractError::FileTooLarge(bytes.len()).into());
    }
    let original_size = i64::try_from(bytes.len())
        .map_err(|_| ApiError::bad_request("file too large to record"))?;

    tracing::info!(
        filename = %filename,
        format = format.label(),
        size = bytes.len(),
        "upload received"
    );

    // Extraction is CPU-bound and can take a while for large PDFs.
    let text = tokio::task::spawn_blocking(move || match format {
        DocumentFormat::Pdf => {
            pravo_extract::process_pdf(&bytes, None).map(pravo_extract::AssembledDocument::into_text)
        }
        other => pravo_extract::extract(&bytes, other),
    })
    .await
    .map_err(|e| ApiError::internal(format!("extraction task failed: {e}")))??;

    let stored_name = stored_filename(&filename);
    let record = state
        .bridge
        .upload_and_record(text.as_bytes(), &stored_name, original_size)
        .await?;

    Ok(Json(UploadResponse {
        id: record.id,
        filename: record.name,
        size: record.file_size,
    }))
}

pub(crate) async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<FileSummary>>, ApiError> {
    let records = state.store.list_records().await?;
    let summaries = records
        .into_iter()
        .map(|r| FileSummary {
            id: r.id,
            filename: r.name,
            size: r.file_size,
            created_at: r.created_at.to_rfc3339(),
        })
        .collect();
    Ok(Json(summaries))
}

/// Delete by local record id, falling back to treating the id as a raw
/// provider file id when no record matches.
pub(crate) async fn delete_handler(
    State(state): State<AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    match state.bridge.delete_record_and_remote(&id).await {
        Ok(record) => Ok(Json(DeleteResponse {
            deleted: record.id,
        })),
        Err(StoreError::NotFound(_)) => {
            state.files.delete(&id).await?;
            Ok(Json(DeleteResponse { deleted: id }))
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn delete_by_name_handler(
    State(state): State<AppState>,
    axum::extract::Path(name): axum::extract::Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = state.files.delete_by_name(&name).await?;
    Ok(Json(DeleteResponse { deleted: id }))
}

pub(crate) async fn delete_all_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeleteOutcome>>, ApiError> {
    let outcomes = state.files.delete_all().await?;
    Ok(Json(outcomes))
}

pub(crate) async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("message is empty"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::bad_request(format!(
            "message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }

    // Attachment ids may be local record ids or raw provider file ids;
    // record ids are resolved (and verified) against the provider first.
    let attachment = match payload.attachment_id {
        Some(id) => match state.bridge.resolve_remote_id(&id).await {
            Ok(remote_id) => Some(remote_id),
            Err(StoreError::NotFound(_)) => Some(id),
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    let response = state.chat.ask(message, attachment.as_deref()).await?;
    Ok(Json(ChatResponse { response }))
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub(crate) async fn metrics_handler(
    State(state): State<AppState>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let record_count = state.store.count_records().await?;
    // Provider outage must not take the metrics endpoint down with it.
    let provider_file_count = state.files.list(false).await.ok().map(|files| files.len());

    Ok(Json(MetricsResponse {
        uptime_secs: state.started_at.elapsed().as_secs(),
        record_count,
        provider_file_count,
    }))
}

fn stored_filename(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original);
    format!("{stem}.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_filename_replaces_extension() {
        assert_eq!(stored_filename("contract.pdf"), "contract.txt");
        assert_eq!(stored_filename("44-ФЗ.docx"), "44-ФЗ.txt");
        assert_eq!(stored_filename("notes.txt"), "notes.txt");
    }

    #[test]
    fn chat_payload_defaults_attachment() {
        let payload: ChatPayload = serde_json::from_str(r#"{"message":"привет"}"#).unwrap();
        assert_eq!(payload.message, "привет");
        assert!(payload.attachment_id.is_none());
    }

    #[test]
    fn upload_response_serializes() {
        let resp = UploadResponse {
            id: "abc".into(),
            filename: "doc.txt".into(),
            size: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"filename\":\"doc.txt\""));
    }
}
