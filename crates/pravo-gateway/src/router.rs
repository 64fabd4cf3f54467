use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    chat_handler, delete_all_handler, delete_by_name_handler, delete_handler, health_handler,
    list_handler, metrics_handler, upload_handler,
};
use super::server::AppState;

pub(crate) fn build_router(state: AppState, max_body_size: usize) -> Router {
    let api = Router::new()
        .route(
            "/files",
            post(upload_handler)
                .get(list_handler)
                .delete(delete_all_handler),
        )
        .route("/files/{id}", delete(delete_handler))
        .route("/files/name/{name}", delete(delete_by_name_handler))
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http());

    Router::new().nest("/api", api).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use pravo_gigachat::mock::{MockChatApi, MockFileApi};
    use pravo_gigachat::{ChatOrchestrator, FileStore, GigaChatError};
    use pravo_store::{PersistenceBridge, SqliteStore};
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "test-boundary";

    async fn make_app(file_api: Arc<MockFileApi>, chat_api: Arc<MockChatApi>) -> Router {
        let files = Arc::new(FileStore::new(file_api));
        let store = SqliteStore::new(":memory:").await.expect("in-memory store");
        let bridge = Arc::new(PersistenceBridge::new(files.clone(), store.clone()));
        let chat = Arc::new(ChatOrchestrator::new(chat_api, files.clone()));
        let state = AppState {
            files,
            store,
            bridge,
            chat,
            max_file_size: 1_048_576,
            started_at: Instant::now(),
        };
        build_router(state, 2_097_152)
    }

    async fn default_app() -> Router {
        make_app(
            Arc::new(MockFileApi::new()),
            Arc::new(MockChatApi::default()),
        )
        .await
    }

    fn multipart_upload(filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/files")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = default_app().await;
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn txt_upload_records_and_lists() {
        let app = default_app().await;

        let resp = app
            .clone()
            .oneshot(multipart_upload("notes.txt", "Договор поставки".as_bytes()))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["filename"], "notes.txt");
        assert!(json["id"].is_string());

        let req = Request::builder()
            .uri("/api/files")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["filename"], "notes.txt");
    }

    #[tokio::test]
    async fn unsupported_extension_rejected() {
        let app = default_app().await;
        let resp = app
            .oneshot(multipart_upload("image.png", b"not a document"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let json = json_body(resp).await;
        assert_eq!(json["kind"], "unsupported_format");
    }

    #[tokio::test]
    async fn empty_document_rejected() {
        let app = default_app().await;
        let resp = app
            .oneshot(multipart_upload("blank.txt", b"   \n  "))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let json = json_body(resp).await;
        assert_eq!(json["kind"], "empty_document");
    }

    #[tokio::test]
    async fn chat_forwards_message() {
        let chat_api = Arc::new(MockChatApi::with_responses(vec![Ok(Some(
            "ответ".to_owned(),
        ))]));
        let app = make_app(Arc::new(MockFileApi::new()), chat_api).await;

        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message":"что такое оферта?"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["response"], "ответ");
    }

    #[tokio::test]
    async fn chat_rejects_blank_message() {
        let app = default_app().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message":"   "}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn chat_rejects_oversized_message() {
        let app = default_app().await;
        let long = "а".repeat(10_001);
        let body = serde_json::json!({ "message": long });
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 400);
        let json = json_body(resp).await;
        assert_eq!(json["kind"], "invalid_request");
    }

    #[tokio::test]
    async fn chat_maps_provider_outage_to_bad_gateway() {
        let chat_api = Arc::new(MockChatApi::with_responses(vec![Err(
            GigaChatError::Unavailable("connection refused".to_owned()),
        )]));
        let app = make_app(Arc::new(MockFileApi::new()), chat_api).await;

        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message":"вопрос","attachment_id":"f-9"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 502);
        let json = json_body(resp).await;
        assert_eq!(json["kind"], "provider_unavailable");
    }

    #[tokio::test]
    async fn chat_resolves_record_id_to_provider_file() {
        let file_api = Arc::new(MockFileApi::new());
        let chat_api = Arc::new(MockChatApi::default());
        let app = make_app(file_api.clone(), chat_api.clone()).await;

        let resp = app
            .clone()
            .oneshot(multipart_upload("law.txt", b"full text of the statute"))
            .await
            .unwrap();
        let json = json_body(resp).await;
        let record_id = json["id"].as_str().unwrap().to_owned();

        let body = serde_json::json!({ "message": "вопрос", "attachment_id": record_id });
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);

        // The request went out with the provider file id, not the record id.
        let attachments = chat_api.seen_attachments();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0], vec!["f-0".to_owned()]);

        // Evicting the provider file turns the same id into a dangling
        // reference.
        file_api.evict("f-0");
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
        let json = json_body(resp).await;
        assert_eq!(json["kind"], "dangling_reference");
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let app = default_app().await;
        let req = Request::builder()
            .method("DELETE")
            .uri("/api/files/no-such-id")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
        let json = json_body(resp).await;
        assert_eq!(json["kind"], "not_found");
    }

    #[tokio::test]
    async fn upload_then_delete_clears_catalog() {
        let app = default_app().await;

        let resp = app
            .clone()
            .oneshot(multipart_upload("doc.txt", b"some contract text"))
            .await
            .unwrap();
        let json = json_body(resp).await;
        let id = json["id"].as_str().unwrap().to_owned();

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/api/files/{id}"))
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);

        let req = Request::builder()
            .uri("/api/files")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let json = json_body(resp).await;
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_by_provider_filename() {
        let file_api = Arc::new(MockFileApi::with_files(&["old.txt"]));
        let app = make_app(file_api, Arc::new(MockChatApi::default())).await;

        let req = Request::builder()
            .method("DELETE")
            .uri("/api/files/name/old.txt")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["deleted"], "f-0");
    }

    #[tokio::test]
    async fn bulk_delete_reports_per_item() {
        let file_api = Arc::new(MockFileApi::with_files(&["a.txt", "b.txt"]));
        file_api.fail_delete("f-1");
        let app = make_app(file_api, Arc::new(MockChatApi::default())).await;

        let req = Request::builder()
            .method("DELETE")
            .uri("/api/files")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        let outcomes = json.as_array().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0]["ok"], true);
        assert_eq!(outcomes[1]["ok"], false);
    }

    #[tokio::test]
    async fn metrics_reports_counts() {
        let file_api = Arc::new(MockFileApi::with_files(&["a.txt"]));
        let app = make_app(file_api, Arc::new(MockChatApi::default())).await;

        let req = Request::builder()
            .uri("/api/metrics")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["record_count"], 0);
        assert_eq!(json["provider_file_count"], 1);
    }
}
