//! HTTP backend for the chat controller and the terminal client built on it.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

use crate::controller::{AskBackend, AskOutcome, ChatController, KeyHandling, KeyPress};
use crate::models::{AskRequest, AskResponse, DocumentInfo};
use crate::view::{ChatView, DocumentLabel, Entry, EntryId, Transcript};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// HTTP Backend
// ============================================================================

/// Talks to a running pdfchat server.
///
/// No timeout is set: a request that never settles leaves the controller
/// busy, the same as a browser `fetch`.
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base: Url) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl AskBackend for HttpBackend {
    async fn pdf_info(&self) -> Result<DocumentInfo, ClientError> {
        let url = self.base.join("api/pdf_info")?;
        // A 404 still carries a JSON body with `error`.
        let info = self.client.get(url).send().await?.json().await?;
        Ok(info)
    }

    async fn ask(&self, question: &str) -> Result<AskResponse, ClientError> {
        let url = self.base.join("api/ask")?;
        let body = AskRequest {
            question: question.to_string(),
        };
        let response = self.client.post(url).json(&body).send().await?.json().await?;
        Ok(response)
    }
}

// ============================================================================
// Terminal View
// ============================================================================

/// Prints view changes to stdout as they happen.
pub struct TerminalView {
    transcript: Transcript,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn set_input(&mut self, line: &str) {
        self.transcript.input = line.to_string();
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView for TerminalView {
    fn render_document_info(&mut self, label: DocumentLabel) {
        println!("{}", label);
        self.transcript.render_document_info(label);
    }

    fn set_viewer_source(&mut self, source: &str) {
        println!("Viewer: {}", source);
        self.transcript.set_viewer_source(source);
    }

    fn hide_welcome(&mut self) {
        self.transcript.hide_welcome();
    }

    fn read_input(&self) -> String {
        self.transcript.read_input()
    }

    fn clear_input(&mut self) {
        self.transcript.clear_input();
    }

    fn append_entry(&mut self, entry: Entry) -> EntryId {
        let id = self.transcript.append_entry(entry.clone());
        match entry {
            Entry::Question(text) => println!("you> {}", text),
            Entry::Answer { text, .. } => {
                println!("pdf> {}", text);
                println!("     [Show Details: :details {}]", id.0);
            }
            Entry::Error(text) => println!("pdf! {}", text),
        }
        id
    }

    fn show_loading(&mut self) {
        println!("...");
        self.transcript.show_loading();
    }

    fn hide_loading(&mut self) {
        self.transcript.hide_loading();
    }

    fn details_shown(&self, id: EntryId) -> Option<bool> {
        self.transcript.details_shown(id)
    }

    fn set_details(&mut self, id: EntryId, shown: bool, label: &str) {
        self.transcript.set_details(id, shown, label);
        if shown {
            if let Some(Entry::Answer { details, .. }) = self.transcript.entry(id) {
                for line in details.lines() {
                    println!("     {}", line);
                }
            }
        }
        println!("     [{}: :details {}]", label, id.0);
    }
}

// ============================================================================
// Terminal Loop
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Details(EntryId),
    Question(String),
    Empty,
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed == ":quit" || trimmed == ":q" {
        return Command::Quit;
    }
    if let Some(rest) = trimmed.strip_prefix(":details") {
        if let Ok(n) = rest.trim().parse::<usize>() {
            return Command::Details(EntryId(n));
        }
    }
    if trimmed.is_empty() {
        Command::Empty
    } else {
        Command::Question(line.to_string())
    }
}

/// Interactive chat against `server` until EOF or `:quit`.
pub async fn run_terminal(server: Url) -> Result<(), ClientError> {
    let backend = HttpBackend::new(server)?;
    tracing::info!("Connecting to {}", backend.base());
    let controller = ChatController::new(TerminalView::new(), backend);
    controller.load_document_info().await;
    println!("Ask a question about the document. `:details N` toggles details, `:quit` exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Empty => {}
            Command::Details(id) => {
                if controller.toggle_details(id).is_none() {
                    println!("No details for entry {}", id.0);
                }
            }
            Command::Question(text) => {
                controller.view_mut().set_input(&text);
                if let KeyHandling::Submitted(AskOutcome::Ignored) =
                    controller.handle_key(KeyPress::enter()).await
                {
                    tracing::debug!("Question ignored");
                }
            }
        }
    }

    let asked = controller
        .into_view()
        .transcript()
        .entries()
        .filter(|(_, e)| matches!(e, Entry::Question(_)))
        .count();
    tracing::info!(questions = asked, "Chat session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{server, AppState};
    use std::sync::Arc;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(":quit"), Command::Quit);
        assert_eq!(parse_command(" :details 3 "), Command::Details(EntryId(3)));
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(
            parse_command("what is it?"),
            Command::Question("what is it?".to_string())
        );
        // Malformed details command falls through as a question
        assert_eq!(
            parse_command(":details x"),
            Command::Question(":details x".to_string())
        );
    }

    #[test]
    fn test_endpoints_join_onto_base() {
        let backend = HttpBackend::new(Url::parse("http://127.0.0.1:5001/").unwrap()).unwrap();
        assert_eq!(
            backend.base().join("api/ask").unwrap().as_str(),
            "http://127.0.0.1:5001/api/ask"
        );
    }

    #[tokio::test]
    async fn test_controller_against_server_without_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(dir.path().to_path_buf(), None));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, server::router(state)).await });

        let base = Url::parse(&format!("http://{}/", addr)).unwrap();
        let controller = ChatController::new(Transcript::new(), HttpBackend::new(base).unwrap());

        // The 404 reply still decodes into its `error` field
        controller.load_document_info().await;
        assert_eq!(
            controller.view().info,
            Some(DocumentLabel::Error("No PDF file found".to_string()))
        );
        assert!(controller.view().viewer_source.is_none());

        let outcome = controller.ask(Some("what is this?")).await;
        let AskOutcome::ServerError(id) = outcome else {
            panic!("expected a server error, got {:?}", outcome);
        };
        assert_eq!(
            controller.view().entry(id),
            Some(&Entry::Error("Error: QA system not ready".to_string()))
        );
        assert!(!controller.is_busy());
        assert!(!controller.view().is_loading());
    }

    #[test]
    fn test_terminal_view_records_entries() {
        let mut view = TerminalView::new();
        let id = view.append_entry(Entry::Question("hello".to_string()));
        assert_eq!(
            view.transcript().entry(id),
            Some(&Entry::Question("hello".to_string()))
        );
    }
}
