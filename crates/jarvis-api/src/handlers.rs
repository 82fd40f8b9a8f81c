//! Route handler functions for all API endpoints.

use std::path::Path;

use axum::extract::{Multipart, Query, State};
use axum::Json;
use jarvis_core::{ChatReply, DEFAULT_SESSION};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default = "default_session")]
    pub session_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Registered command tokens, sorted.
    pub skills: Vec<String>,
}

/// Body of `POST /upload`. Rejections carry `ok: false` and `error`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_indexed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    fn rejected(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            filename: None,
            chunks_indexed: None,
            active_document: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET / - service banner.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        message: "Jarvis API running".to_string(),
        endpoints: ["/chat", "/upload", "/health"]
            .iter()
            .map(|e| e.to_string())
            .collect(),
    })
}

/// GET /health - liveness plus the loaded skills.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        skills: state.registry.tokens(),
    })
}

/// POST /chat - run one message through the pipeline.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state.pipeline.handle(Some(&req.session_id), &req.text).await?;
    Ok(Json(reply))
}

/// POST /upload?session_id=... - store a document and make it the session's
/// active document.
pub async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let session_id = match params.session_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_SESSION.to_string(),
    };

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no name".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let Some((filename, data)) = upload else {
        return Err(ApiError::BadRequest(
            "Missing multipart field 'file'".to_string(),
        ));
    };

    let accepted = accepted_extensions(
        &state.config.documents.allowed_extensions,
        state.documents.supported_extensions(),
    );
    let extension = Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    if !extension.is_some_and(|ext| accepted.contains(&ext)) {
        warn!(session_id = %session_id, filename = %filename, "Rejected upload with unsupported extension");
        let listed = accepted
            .iter()
            .map(|a| format!(".{}", a))
            .collect::<Vec<_>>()
            .join(", ");
        return Ok(Json(UploadResponse::rejected(format!(
            "Only {} files are supported.",
            listed
        ))));
    }

    let dir = state.upload_root.join(session_dir_name(&session_id));
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create upload directory: {}", e)))?;
    let path = dir.join(&filename);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to save upload: {}", e)))?;

    let chunks = state.documents.index_file(&session_id, &path, Some(&filename))?;
    info!(session_id = %session_id, filename = %filename, chunks, "Document uploaded");

    Ok(Json(UploadResponse {
        ok: true,
        active_document: state.documents.active(&session_id),
        filename: Some(filename),
        chunks_indexed: Some(chunks),
        error: None,
    }))
}

/// Configured extensions that the document extractor can actually read.
fn accepted_extensions(allowed: &[String], supported: &[&str]) -> Vec<String> {
    allowed
        .iter()
        .map(|a| a.trim_start_matches('.').to_lowercase())
        .filter(|a| supported.contains(&a.as_str()))
        .collect()
}

/// Session ids are client supplied; keep the directory name to a safe subset.
fn session_dir_name(session_id: &str) -> String {
    session_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
