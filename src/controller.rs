//! Chat/viewer controller.
//!
//! Loads the document info once, submits questions one at a time, and renders
//! answers, errors and the per-answer details panel through a [`ChatView`].
//! All operations take `&self` and run on one thread: two ask futures polled
//! together share the busy flag, so the second one is rejected instead of
//! queued.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::future::Future;
use std::time::{Duration, Instant};

use crate::client::ClientError;
use crate::models::{AskResponse, DocumentInfo};
use crate::view::{ChatView, Details, DocumentLabel, Entry, EntryId, HIDE_DETAILS, SHOW_DETAILS};

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

pub const LOAD_FAILED: &str = "Failed to load document info";

// ============================================================================
// Backend
// ============================================================================

/// The two server round-trips the controller makes.
pub trait AskBackend {
    fn pdf_info(&self) -> impl Future<Output = Result<DocumentInfo, ClientError>>;
    fn ask(&self, question: &str) -> impl Future<Output = Result<AskResponse, ClientError>>;
}

// ============================================================================
// Session State
// ============================================================================

/// Busy flag plus the start time of the request in flight.
#[derive(Debug, Default)]
pub struct SessionState {
    busy: Cell<bool>,
    started_at: Cell<Option<Instant>>,
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    fn begin(&self) {
        self.busy.set(true);
        self.started_at.set(Some(Instant::now()));
    }

    fn elapsed(&self) -> Duration {
        self.started_at
            .get()
            .map(|t| t.elapsed())
            .unwrap_or_default()
    }

    fn end(&self) {
        self.busy.set(false);
        self.started_at.set(None);
    }
}

/// Clears the busy flag and the loading entry when dropped, so every exit
/// path of an ask (including a dropped future) leaves the view usable.
struct InFlight<'a, V: ChatView> {
    session: &'a SessionState,
    view: &'a RefCell<V>,
}

impl<V: ChatView> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        self.session.end();
        match self.view.try_borrow_mut() {
            Ok(mut view) => view.hide_loading(),
            Err(_) => tracing::warn!("View still borrowed; loading entry left in place"),
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    /// Busy, or the question was blank. Nothing rendered, nothing sent.
    Ignored,
    Answered(EntryId),
    ServerError(EntryId),
    NetworkError(EntryId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn enter() -> Self {
        Self {
            key: Key::Enter,
            shift: false,
        }
    }

    pub fn shift_enter() -> Self {
        Self {
            key: Key::Enter,
            shift: true,
        }
    }
}

/// What the platform should do with the key after the controller saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHandling {
    /// The key submitted a question; suppress the input's default action.
    Submitted(AskOutcome),
    Default,
}

// ============================================================================
// Controller
// ============================================================================

pub struct ChatController<V, B> {
    view: RefCell<V>,
    backend: B,
    session: SessionState,
}

impl<V: ChatView, B: AskBackend> ChatController<V, B> {
    pub fn new(view: V, backend: B) -> Self {
        Self {
            view: RefCell::new(view),
            backend,
            session: SessionState::default(),
        }
    }

    pub fn view(&self) -> Ref<'_, V> {
        self.view.borrow()
    }

    /// Mutable access for the platform, e.g. to type into the input.
    pub fn view_mut(&self) -> RefMut<'_, V> {
        self.view.borrow_mut()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    pub fn into_view(self) -> V {
        self.view.into_inner()
    }

    /// Fetch the document info and fill the label and viewer.
    pub async fn load_document_info(&self) {
        let result = self.backend.pdf_info().await;
        let mut view = self.view.borrow_mut();
        match result {
            Ok(info) => match (info.error, info.file_name) {
                (Some(error), _) => view.render_document_info(DocumentLabel::Error(error)),
                (None, Some(name)) => {
                    view.set_viewer_source(&viewer_source(&name));
                    view.render_document_info(DocumentLabel::Document(name));
                }
                (None, None) => {
                    tracing::warn!("pdf_info reply carried neither file_name nor error");
                    view.render_document_info(DocumentLabel::Error(LOAD_FAILED.to_string()));
                }
            },
            Err(e) => {
                tracing::warn!("Failed to load document info: {}", e);
                view.render_document_info(DocumentLabel::Error(LOAD_FAILED.to_string()));
            }
        }
    }

    /// Submit a question. A non-empty `explicit` text is sent as given and
    /// bypasses the input field; otherwise the trimmed input is used.
    pub async fn ask(&self, explicit: Option<&str>) -> AskOutcome {
        if self.session.is_busy() {
            return AskOutcome::Ignored;
        }

        let (question, from_input) = match explicit.filter(|text| !text.is_empty()) {
            Some(text) => (text.to_string(), false),
            None => (self.view.borrow().read_input().trim().to_string(), true),
        };
        if question.trim().is_empty() {
            return AskOutcome::Ignored;
        }

        {
            let mut view = self.view.borrow_mut();
            view.hide_welcome();
            view.append_entry(Entry::Question(question.clone()));
        }
        self.session.begin();
        let _in_flight = InFlight {
            session: &self.session,
            view: &self.view,
        };
        {
            let mut view = self.view.borrow_mut();
            if from_input {
                view.clear_input();
            }
            view.show_loading();
        }

        tracing::debug!(question = %question, "Submitting question");
        let result = self.backend.ask(&question).await;

        let mut view = self.view.borrow_mut();
        match result {
            Ok(response) => match response.error {
                Some(error) => {
                    tracing::debug!(error = %error, "Server reported an error");
                    AskOutcome::ServerError(view.append_entry(Entry::Error(format!("Error: {}", error))))
                }
                None => {
                    let details = Details::new(
                        format_elapsed(self.session.elapsed()),
                        response.sources.as_deref().unwrap_or_default(),
                    );
                    let text = response.answer.unwrap_or_default();
                    AskOutcome::Answered(view.append_entry(Entry::Answer { text, details }))
                }
            },
            Err(e) => {
                tracing::warn!("Question failed: {}", e);
                AskOutcome::NetworkError(
                    view.append_entry(Entry::Error(format!("Network error: {}", e))),
                )
            }
        }
        // `view` is released before `_in_flight` runs its drop.
    }

    /// Flip the details panel of an answer. Returns the new shown state, or
    /// `None` when the entry has no panel.
    pub fn toggle_details(&self, id: EntryId) -> Option<bool> {
        let mut view = self.view.borrow_mut();
        let shown = !view.details_shown(id)?;
        let label = if shown { HIDE_DETAILS } else { SHOW_DETAILS };
        view.set_details(id, shown, label);
        Some(shown)
    }

    /// Key handler for the question input.
    pub async fn handle_key(&self, key: KeyPress) -> KeyHandling {
        match key {
            KeyPress {
                key: Key::Enter,
                shift: false,
            } => KeyHandling::Submitted(self.ask(None).await),
            _ => KeyHandling::Default,
        }
    }
}

/// Viewer URL path for a served file name.
pub fn viewer_source(file_name: &str) -> String {
    format!("/pdf/{}", urlencoding::encode(file_name))
}

/// Seconds, fixed to two decimals.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}", elapsed.as_secs_f64())
}
