//! Data models shared by the server, the QA engine and the chat controller.
//!
//! The JSON shapes here are the wire contract of `/api/pdf_info` and
//! `/api/ask`. Both sides of the wire use the same types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Document Info
// ============================================================================

/// Body of `GET /api/pdf_info`: either the served file or an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentInfo {
    pub fn found(file_name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            file_path: Some(file_path.into()),
            error: None,
        }
    }

    pub fn missing(error: impl Into<String>) -> Self {
        Self {
            file_name: None,
            file_path: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Ask Request / Response
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

/// Body of `POST /api/ask`.
///
/// A successful reply carries `answer` and `sources`; a failed one carries
/// `error`. Clients decide on the presence of `error` alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AskResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AskResponse {
    pub fn answered(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            success: true,
            answer: Some(answer.into()),
            sources: Some(sources),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            answer: None,
            sources: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Document Chunks
// ============================================================================

/// A retrievable piece of the source PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    /// Zero-based page index the text came from.
    pub page: usize,
    pub source: PathBuf,
}

impl Chunk {
    /// Human-readable citation, e.g. `Page 3` for the third page.
    pub fn page_label(&self) -> String {
        format!("Page {}", self.page + 1)
    }
}

/// Result of answering one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
}
