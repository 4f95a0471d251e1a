//! HTTP surface
//!
//! One route: `POST /upload`, multipart form-data with the audio file and
//! four free-text context fields. Permissive CORS for frontend development.

use crate::feedback::FeedbackService;
use crate::pipeline::CritiquePipeline;
use crate::prompt::ContextBundle;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower_http::cors::{Any, CorsLayer};

/// Upload size cap
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct CritiqueResponse {
    pub analysis: String,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the application router
pub fn router<S>(pipeline: Arc<CritiquePipeline<S>>) -> Router
where
    S: FeedbackService + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload", post(upload_audio::<S>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(pipeline)
}

/// POST /upload - critique one uploaded recording
async fn upload_audio<S>(
    State(pipeline): State<Arc<CritiquePipeline<S>>>,
    mut multipart: Multipart,
) -> impl IntoResponse
where
    S: FeedbackService + 'static,
{
    let mut audio: Option<Vec<u8>> = None;
    let mut context = ContextBundle::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => match field.bytes().await {
                Ok(bytes) => audio = Some(bytes.to_vec()),
                Err(e) => {
                    log::warn!("Failed to read uploaded file: {}", e);
                    return error_response(StatusCode::BAD_REQUEST, "Failed to read uploaded file");
                }
            },
            "lyrics" | "chords" | "vocal_notes" | "goals" => {
                if let Ok(bytes) = field.bytes().await {
                    let value = String::from_utf8_lossy(&bytes).to_string();
                    match field_name.as_str() {
                        "lyrics" => context.lyrics = value,
                        "chords" => context.chords = value,
                        "vocal_notes" => context.vocal_notes = value,
                        _ => context.goals = value,
                    }
                }
            }
            _ => {}
        }
    }

    let audio = match audio {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return error_response(StatusCode::BAD_REQUEST, "No audio file provided"),
    };

    log::debug!("Received upload ({} bytes)", audio.len());

    // Spool the upload to a scoped temp file; the pipeline owns its lifetime
    // from here and removes it on every exit path
    let upload = match spool_upload(&audio) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("Failed to spool upload: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store uploaded file",
            );
        }
    };

    match pipeline.critique(upload, context).await {
        Ok(critique) => Json(CritiqueResponse {
            analysis: critique.analysis,
            feedback: critique.feedback,
        })
        .into_response(),
        Err(e) => {
            log::warn!("Critique failed: {}", e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
        }
    }
}

fn spool_upload(bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
