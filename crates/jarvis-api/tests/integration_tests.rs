//! Integration tests for the Jarvis API.
//!
//! Every test builds its own state over a temporary data directory, a mock
//! language model and a static search backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use jarvis_api::create_router;
use jarvis_api::handlers::{HealthResponse, RootResponse, UploadResponse};
use jarvis_api::state::AppState;
use jarvis_core::{ChatReply, JarvisConfig, Route};
use jarvis_llm::{LanguageModel, MockLanguageModel};
use jarvis_search::{SearchHit, StaticSearch, WebSearch};
use jarvis_storage::{JsonFileStore, MemoryStore};

// =============================================================================
// Helpers
// =============================================================================

const BOUNDARY: &str = "jarvis-test-boundary";

struct TestApp {
    dir: tempfile::TempDir,
    llm: Arc<MockLanguageModel>,
    state: AppState,
}

impl TestApp {
    fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}

fn make_app_with(llm: MockLanguageModel, search: StaticSearch) -> TestApp {
    make_app_with_config(llm, search, JarvisConfig::default())
}

fn make_app_with_config(llm: MockLanguageModel, search: StaticSearch, mut config: JarvisConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    config.general.data_dir = dir.path().display().to_string();
    config.general.timezone = "UTC".to_string();

    let llm = Arc::new(llm);
    let memory: Arc<dyn MemoryStore> = Arc::new(JsonFileStore::new(dir.path().join("memory.json")));
    let state = AppState::build(
        config,
        Arc::clone(&llm) as Arc<dyn LanguageModel>,
        Arc::new(search) as Arc<dyn WebSearch>,
        memory,
    )
    .unwrap();
    TestApp { dir, llm, state }
}

fn make_app() -> TestApp {
    make_app_with(MockLanguageModel::echo(), StaticSearch::empty())
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn post_file(uri: &str, field: &str, filename: &str, content: &str) -> Request<Body> {
    post_bytes(uri, field, filename, content.as_bytes())
}

fn post_bytes(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn chat(app: &TestApp, json: &str) -> (StatusCode, Vec<u8>) {
    let resp = app.router().oneshot(post_json("/chat", json)).await.unwrap();
    let status = resp.status();
    (status, body_bytes(resp).await)
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_root_banner() {
    let app = make_app();
    let resp = app
        .router()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let root: RootResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(root.status, "ok");
    assert!(root.endpoints.contains(&"/chat".to_string()));
}

#[tokio::test]
async fn test_health_lists_skills() {
    let app = make_app();
    let resp = app
        .router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "ok");
    for token in ["/calc", "/help", "/pdf", "/doc", "/remember", "/notes", "/time"] {
        assert!(health.skills.contains(&token.to_string()), "missing {token}");
    }
}

// =============================================================================
// POST /chat
// =============================================================================

#[tokio::test]
async fn test_chat_default_route() {
    let app = make_app();
    let (status, bytes) = chat(&app, r#"{"session_id":"s1","text":"hello"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let reply: ChatReply = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.session_id, "s1");
    assert_eq!(reply.route, Route::Chat);
    assert_eq!(reply.output, "echo: hello");
}

#[tokio::test]
async fn test_chat_session_defaults() {
    let app = make_app();
    let (status, bytes) = chat(&app, r#"{"text":"hello"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["session_id"], "default");
    assert_eq!(json["route"], "chat");
}

#[tokio::test]
async fn test_chat_command_route() {
    let app = make_app();
    let (_, bytes) = chat(&app, r#"{"text":"/calc (2+3)*4"}"#).await;
    let reply: ChatReply = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.route, Route::Command);
    assert_eq!(reply.output, "✅ (2+3)*4 = 20");
}

#[tokio::test]
async fn test_chat_time_route() {
    let app = make_app();
    let (_, bytes) = chat(&app, r#"{"text":"what is the date"}"#).await;
    let reply: ChatReply = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.route, Route::Time);
    assert!(reply.output.starts_with("Current time: "));
    assert!(reply.output.ends_with("UTC"));
    assert_eq!(app.llm.call_count(), 0);
}

#[tokio::test]
async fn test_chat_web_route() {
    let hits = vec![SearchHit::new("Headline", "https://news.test", "Something happened")];
    let app = make_app_with(MockLanguageModel::scripted(["Here is the news."]), StaticSearch::new(hits));
    let (_, bytes) = chat(&app, r#"{"text":"latest news"}"#).await;
    let reply: ChatReply = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.route, Route::Web);
    assert_eq!(reply.output, "Here is the news.");
}

#[tokio::test]
async fn test_chat_web_error_route() {
    let app = make_app_with(MockLanguageModel::echo(), StaticSearch::failing("offline"));
    let (status, bytes) = chat(&app, r#"{"text":"latest news"}"#).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["route"], "web_error");
}

#[tokio::test]
async fn test_chat_empty_text_returns_400() {
    let app = make_app();
    let (status, bytes) = chat(&app, r#"{"text":"   "}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "bad_request");
    assert!(json["message"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_chat_oversized_text_returns_400() {
    let app = make_app();
    let text = "a".repeat(4001);
    let (status, _) = chat(&app, &format!(r#"{{"text":"{}"}}"#, text)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_model_failure_returns_502() {
    let app = make_app_with(MockLanguageModel::failing("quota exceeded"), StaticSearch::empty());
    let (status, bytes) = chat(&app, r#"{"text":"hello"}"#).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "upstream_error");
}

#[tokio::test]
async fn test_chat_command_failure_is_not_http_error() {
    let app = make_app_with(MockLanguageModel::failing("down"), StaticSearch::empty());
    let (status, bytes) = chat(&app, r#"{"session_id":"s1","text":"/recall"}"#).await;
    assert_eq!(status, StatusCode::OK);
    let reply: ChatReply = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.route, Route::Command);
}

#[tokio::test]
async fn test_chat_memory_persists_across_requests() {
    let app = make_app();
    chat(&app, r#"{"session_id":"s1","text":"/remember I prefer short answers"}"#).await;
    let (_, bytes) = chat(&app, r#"{"session_id":"s1","text":"/recall"}"#).await;
    let reply: ChatReply = serde_json::from_slice(&bytes).unwrap();
    assert!(reply.output.contains("I prefer short answers"));
}

// =============================================================================
// POST /upload
// =============================================================================

#[tokio::test]
async fn test_upload_indexes_and_activates_document() {
    let app = make_app();
    let resp = app
        .router()
        .oneshot(post_file(
            "/upload?session_id=s1",
            "file",
            "notes.txt",
            "The project deadline is March 3rd.",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let upload: UploadResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(upload.ok);
    assert_eq!(upload.filename.as_deref(), Some("notes.txt"));
    assert_eq!(upload.chunks_indexed, Some(1));
    assert_eq!(upload.active_document.as_deref(), Some("notes.txt"));
    assert!(app.dir.path().join("uploads/s1/notes.txt").exists());

    let (_, bytes) = chat(&app, r#"{"session_id":"s1","text":"what does this document say about the deadline"}"#).await;
    let reply: ChatReply = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.route, Route::Document);
    assert!(app.llm.last_prompt().unwrap().contains("March 3rd"));
}

#[tokio::test]
async fn test_upload_is_scoped_to_session() {
    let app = make_app();
    app.router()
        .oneshot(post_file("/upload?session_id=a", "file", "a.md", "alpha content"))
        .await
        .unwrap();

    let (_, bytes) = chat(&app, r#"{"session_id":"b","text":"/pdf what is this"}"#).await;
    let reply: ChatReply = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.output, "No document uploaded yet. Upload a document first.");
}

#[tokio::test]
async fn test_upload_rejects_unsupported_extension() {
    let app = make_app();
    let resp = app
        .router()
        .oneshot(post_file("/upload", "file", "tool.exe", "MZ"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let upload: UploadResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(!upload.ok);
    assert!(upload.error.unwrap().contains(".txt"));
    assert!(app.state.documents.active("default").is_none());
}

#[tokio::test]
async fn test_upload_pdf_is_indexed() {
    let app = make_app();
    let source = app.dir.path().join("source.pdf");
    jarvis_docs::pdf::write_pdf_with_lines(&source, &["The warranty lasts two years."]).unwrap();
    let bytes = std::fs::read(&source).unwrap();

    let resp = app
        .router()
        .oneshot(post_bytes("/upload?session_id=s1", "file", "warranty.pdf", &bytes))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let upload: UploadResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(upload.ok);
    assert_eq!(upload.chunks_indexed, Some(1));

    let (_, bytes) = chat(&app, r#"{"session_id":"s1","text":"/pdf how long is the warranty"}"#).await;
    let reply: ChatReply = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.route, Route::Command);
    assert!(app.llm.last_prompt().unwrap().contains("The warranty lasts two years."));
}

#[tokio::test]
async fn test_upload_unreadable_pdf_returns_400() {
    let app = make_app();
    let resp = app
        .router()
        .oneshot(post_file("/upload?session_id=s1", "file", "fake.pdf", "not really a pdf"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(app.state.documents.active("s1").is_none());
}

#[tokio::test]
async fn test_upload_rejects_allowed_extension_without_extractor() {
    let mut config = JarvisConfig::default();
    config.documents.allowed_extensions = vec!["txt".to_string(), "docx".to_string()];
    let app = make_app_with_config(MockLanguageModel::echo(), StaticSearch::empty(), config);

    let resp = app
        .router()
        .oneshot(post_file("/upload?session_id=s1", "file", "report.docx", "PK"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let upload: UploadResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(!upload.ok);
    assert_eq!(upload.error.as_deref(), Some("Only .txt files are supported."));
    assert!(!app.dir.path().join("uploads/s1/report.docx").exists());
}

#[tokio::test]
async fn test_upload_missing_file_field_returns_400() {
    let app = make_app();
    let resp = app
        .router()
        .oneshot(post_file("/upload", "attachment", "notes.txt", "text"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_strips_directory_components() {
    let app = make_app();
    let resp = app
        .router()
        .oneshot(post_file("/upload?session_id=s1", "file", "../../escape.txt", "text"))
        .await
        .unwrap();
    let upload: UploadResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(upload.filename.as_deref(), Some("escape.txt"));
    assert!(app.dir.path().join("uploads/s1/escape.txt").exists());
}
