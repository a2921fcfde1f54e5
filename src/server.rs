//! Router construction and server start-up.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::documents::{self, DocumentError};
use crate::embedding_cache::{CacheError, EmbeddingCache};
use crate::handlers;
use crate::ollama::{ModelError, OllamaClient};
use crate::qa::{QaEngine, QaError};
use crate::AppState;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("QA system init failed: {0}")]
    Qa(#[from] QaError),
    #[error("PDF loading task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/pdf_info", get(handlers::pdf_info))
        .route("/api/ask", post(handlers::ask))
        .route("/pdf/{filename}", get(handlers::serve_pdf))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the first PDF, index it, and build the engine.
pub async fn build_engine(config: &Config) -> Result<QaEngine<OllamaClient>, StartupError> {
    let pdf_path = documents::first_pdf(&config.source_dir)?;
    tracing::info!("Found PDF: {}", pdf_path.display());

    let chunks = tokio::task::spawn_blocking(move || documents::load_chunks(&pdf_path))
        .await??;

    let model = OllamaClient::new(
        config.ollama_url.clone(),
        &config.llm_model,
        &config.embed_model,
    )?;
    let cache = EmbeddingCache::open(&config.db_path)?;

    tracing::info!("Initializing QA system...");
    let engine = QaEngine::build(model, chunks, Some(&cache)).await?;
    tracing::info!("QA system ready");
    Ok(engine)
}

pub async fn serve(config: Config) -> Result<(), StartupError> {
    let engine = build_engine(&config).await?;
    let state = Arc::new(AppState::new(config.source_dir.clone(), Some(engine)));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| StartupError::Bind {
            addr: config.bind,
            source,
        })?;

    tracing::info!("pdfchat server running at http://{}", config.bind);
    tracing::info!("Source documents: {}", config.source_dir.display());

    axum::serve(listener, router(state))
        .await
        .map_err(StartupError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_builds_without_engine() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(dir.path().to_path_buf(), None));
        let _ = router(state);
    }

    #[tokio::test]
    async fn test_build_engine_fails_without_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_lookup(|key| match key {
            "PDFCHAT_SOURCE_DIR" => Some(dir.path().display().to_string()),
            "PDFCHAT_DB" => Some(dir.path().join("db").display().to_string()),
            _ => None,
        })
        .unwrap();

        let err = build_engine(&config).await.err().unwrap();
        assert!(matches!(err, StartupError::Document(DocumentError::NoPdf(_))));
    }
}
