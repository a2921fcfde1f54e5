//! HTTP route handlers for the web front end.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::documents::first_pdf;
use crate::models::{AskRequest, AskResponse, DocumentInfo};
use crate::templates::render_page;
use crate::{resolve_within, AppState};

// ============================================================================
// Page
// ============================================================================

pub async fn index() -> Html<String> {
    Html(render_page())
}

// ============================================================================
// Document Routes
// ============================================================================

pub async fn pdf_info(State(state): State<Arc<AppState>>) -> Response {
    match first_pdf(&state.source_dir) {
        Ok(path) => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let info = DocumentInfo::found(file_name, path.display().to_string());
            Json(info).into_response()
        }
        Err(e) => {
            tracing::error!("{}", e);
            (
                StatusCode::NOT_FOUND,
                Json(DocumentInfo::missing("No PDF file found")),
            )
                .into_response()
        }
    }
}

pub async fn serve_pdf(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if filename.contains(['/', '\\']) {
        return (StatusCode::BAD_REQUEST, "Invalid filename").into_response();
    }

    let path = match resolve_within(&state.source_dir, &filename) {
        Some(p) => p,
        None => return (StatusCode::NOT_FOUND, "PDF not found").into_response(),
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/pdf")], bytes).into_response(),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read PDF").into_response()
        }
    }
}

// ============================================================================
// Ask
// ============================================================================

pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AskResponse::failed(rejection.body_text())),
            )
                .into_response()
        }
    };

    let question = body.question.trim();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AskResponse::failed("No question provided")),
        )
            .into_response();
    }

    let engine = match &state.qa {
        Some(engine) => engine,
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AskResponse::failed("QA system not ready")),
            )
                .into_response()
        }
    };

    match engine.answer(question).await {
        Ok(answer) => Json(AskResponse::answered(answer.text, answer.sources)).into_response(),
        Err(e) => {
            tracing::error!("Question processing error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AskResponse::failed(e.to_string())),
            )
                .into_response()
        }
    }
}
