//! pdfchat library - re-exports for testing and the binary.
//!
//! - `controller`, `view`, `client`: the chat/viewer controller and the
//!   terminal client that drives it over HTTP
//! - `server`, `handlers`, `templates`: the axum web front end
//! - `qa`, `documents`, `bm25`, `ollama`, `embedding_cache`: question
//!   answering over the served PDF

use std::fs;
use std::path::{Path, PathBuf};

pub mod bm25;
pub mod client;
pub mod config;
pub mod controller;
pub mod documents;
pub mod embedding_cache;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod ollama;
pub mod qa;
pub mod server;
pub mod templates;
pub mod view;

// ============================================================================
// Configuration
// ============================================================================

pub const SOURCE_DIR: &str = "source_documents";
pub const DB_PATH: &str = ".pdfchat_db";

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub source_dir: PathBuf,
    /// `None` until an engine is attached; `/api/ask` answers 500 meanwhile.
    pub qa: Option<qa::QaEngine<ollama::OllamaClient>>,
}

impl AppState {
    pub fn new(source_dir: PathBuf, qa: Option<qa::QaEngine<ollama::OllamaClient>>) -> Self {
        Self { source_dir, qa }
    }
}

/// Resolve `name` inside `base`, refusing anything that lands outside it.
/// Returns `None` for missing files as well.
pub fn resolve_within(base: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return None;
    }
    let canonical_base = fs::canonicalize(base).ok()?;
    let canonical = fs::canonicalize(base.join(name)).ok()?;
    if canonical.starts_with(&canonical_base) && canonical.is_file() {
        Some(canonical)
    } else {
        None
    }
}

pub use client::{ClientError, HttpBackend, TerminalView};
pub use config::{Config, ConfigError};
pub use controller::{
    AskBackend, AskOutcome, ChatController, Key, KeyHandling, KeyPress, SessionState,
};
pub use models::{Answer, AskRequest, AskResponse, Chunk, DocumentInfo};
pub use qa::{QaEngine, QaError};
pub use view::{ChatView, Details, DocumentLabel, Entry, EntryId, Transcript};
