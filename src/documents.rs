//! Locating the served PDF and cutting it into retrievable chunks.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

use crate::models::Chunk;

/// Pages longer than this are split on paragraph boundaries.
pub const MAX_CHUNK_CHARS: usize = 4000;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Source documents directory not found: {0}")]
    MissingDir(PathBuf),
    #[error("No PDF files found in {0}")]
    NoPdf(PathBuf),
    #[error("Cannot read PDF {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Text extraction failed for {path}: {message}")]
    Extract { path: PathBuf, message: String },
    #[error("No text could be extracted from {0}")]
    Empty(PathBuf),
}

// ============================================================================
// Locating the PDF
// ============================================================================

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// The alphabetically first PDF directly inside `dir`.
pub fn first_pdf(dir: &Path) -> Result<PathBuf, DocumentError> {
    if !dir.is_dir() {
        return Err(DocumentError::MissingDir(dir.to_path_buf()));
    }

    let mut pdfs: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_pdf(e.path()))
        .map(|e| e.into_path())
        .collect();
    pdfs.sort();

    pdfs.into_iter()
        .next()
        .ok_or_else(|| DocumentError::NoPdf(dir.to_path_buf()))
}

// ============================================================================
// Chunking
// ============================================================================

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("static regex"))
}

/// Split `text` into pieces of at most roughly `max_chars`, preferring
/// paragraph boundaries. A single paragraph longer than `max_chars` is cut at
/// character boundaries.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for paragraph in paragraph_break().split(text) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        let needed = current.chars().count() + 2 + paragraph.chars().count();
        if !current.is_empty() && needed > max_chars {
            pieces.push(std::mem::take(&mut current));
        }
        if paragraph.chars().count() > max_chars {
            let chars: Vec<char> = paragraph.chars().collect();
            for window in chars.chunks(max_chars) {
                pieces.push(window.iter().collect());
            }
            continue;
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Turn per-page text into chunks. Blank pages are skipped.
pub fn chunk_pages(pages: &[String], source: &Path) -> Vec<Chunk> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(page, text)| {
            split_text(text, MAX_CHUNK_CHARS)
                .into_iter()
                .map(move |text| Chunk {
                    text,
                    page,
                    source: source.to_path_buf(),
                })
        })
        .collect()
}

/// Extract the PDF page by page and chunk it.
pub fn load_chunks(path: &Path) -> Result<Vec<Chunk>, DocumentError> {
    let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
        DocumentError::Extract {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    let chunks = chunk_pages(&pages, path);
    if chunks.is_empty() {
        return Err(DocumentError::Empty(path.to_path_buf()));
    }
    tracing::info!(
        pages = pages.len(),
        chunks = chunks.len(),
        "Processed {}",
        path.display()
    );
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_first_pdf_picks_alphabetically_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("a.PDF"), b"%PDF").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();

        let found = first_pdf(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "a.PDF");
    }

    #[test]
    fn test_first_pdf_ignores_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        fs::write(dir.path().join("archive").join("old.pdf"), b"%PDF").unwrap();

        assert!(matches!(first_pdf(dir.path()), Err(DocumentError::NoPdf(_))));
    }

    #[test]
    fn test_first_pdf_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(first_pdf(&missing), Err(DocumentError::MissingDir(_))));
    }

    #[test]
    fn test_split_short_text_is_one_piece() {
        assert_eq!(split_text("  hello world \n", 100), vec!["hello world"]);
        assert!(split_text(" \n\n ", 100).is_empty());
    }

    #[test]
    fn test_split_on_paragraphs() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let pieces = split_text(text, 10);
        assert_eq!(pieces, vec!["aaaa\n\nbbbb", "cccc"]);
    }

    #[test]
    fn test_split_oversized_paragraph() {
        let text = "x".repeat(25);
        let pieces = split_text(&text, 10);
        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| p.chars().count() <= 10));
    }

    #[test]
    fn test_chunk_pages_keeps_page_index_and_skips_blank() {
        let pages = vec![
            "intro".to_string(),
            "   ".to_string(),
            "details".to_string(),
        ];
        let chunks = chunk_pages(&pages, Path::new("doc.pdf"));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page, 0);
        assert_eq!(chunks[1].page, 2);
        assert_eq!(chunks[1].page_label(), "Page 3");
    }

    #[test]
    fn test_load_chunks_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"not a pdf").unwrap();
        assert!(load_chunks(&path).is_err());
    }
}
