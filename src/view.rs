//! View capabilities the chat controller drives.
//!
//! The controller never touches a document tree or a terminal directly. It
//! talks to a [`ChatView`], which a platform implements. [`Transcript`] is the
//! in-memory implementation used by the terminal client and by tests.

use std::fmt;

pub const SHOW_DETAILS: &str = "Show Details";
pub const HIDE_DETAILS: &str = "Hide Details";
pub const NO_SOURCES: &str = "No sources";

// ============================================================================
// Entries
// ============================================================================

/// Handle to an appended transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub usize);

/// What the info label shows after start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLabel {
    Document(String),
    Error(String),
}

impl fmt::Display for DocumentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLabel::Document(name) => write!(f, "Document: {}", name),
            DocumentLabel::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Hidden metadata panel attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Details {
    /// Seconds with two decimals, e.g. `1.25`.
    pub elapsed: String,
    /// Comma-joined sources, or [`NO_SOURCES`].
    pub sources: String,
}

impl Details {
    pub fn new(elapsed: String, sources: &[String]) -> Self {
        let sources = if sources.is_empty() {
            NO_SOURCES.to_string()
        } else {
            sources.join(", ")
        };
        Self { elapsed, sources }
    }

    pub fn lines(&self) -> [String; 2] {
        [
            format!("Time: {}s", self.elapsed),
            format!("Sources: {}", self.sources),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Question(String),
    Answer { text: String, details: Details },
    Error(String),
}

impl Entry {
    pub fn is_error(&self) -> bool {
        matches!(self, Entry::Error(_))
    }
}

// ============================================================================
// View Trait
// ============================================================================

/// Everything the controller needs from a page.
pub trait ChatView {
    fn render_document_info(&mut self, label: DocumentLabel);
    fn set_viewer_source(&mut self, source: &str);
    fn hide_welcome(&mut self);

    /// Current contents of the question input.
    fn read_input(&self) -> String;
    fn clear_input(&mut self);

    fn append_entry(&mut self, entry: Entry) -> EntryId;
    fn show_loading(&mut self);
    fn hide_loading(&mut self);

    /// Whether the metadata panel of `id` is shown. `None` when the entry has
    /// no panel.
    fn details_shown(&self, id: EntryId) -> Option<bool>;
    fn set_details(&mut self, id: EntryId, shown: bool, label: &str);
}

// ============================================================================
// In-memory Transcript
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Entry {
        id: EntryId,
        entry: Entry,
        details_shown: bool,
        toggle_label: String,
    },
    Loading,
}

/// A page held in memory: info label, viewer source, input and transcript.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub info: Option<DocumentLabel>,
    pub viewer_source: Option<String>,
    pub welcome_visible: bool,
    pub input: String,
    slots: Vec<Slot>,
    next_id: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            info: None,
            viewer_source: None,
            welcome_visible: true,
            input: String::new(),
            slots: Vec::new(),
            next_id: 0,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots, counting the loading entry when present.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::Loading))
    }

    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Entry { id, entry, .. } => Some((*id, entry)),
            Slot::Loading => None,
        })
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    pub fn toggle_label(&self, id: EntryId) -> Option<&str> {
        self.slots.iter().find_map(|s| match s {
            Slot::Entry {
                id: eid,
                entry: Entry::Answer { .. },
                toggle_label,
                ..
            } if *eid == id => Some(toggle_label.as_str()),
            _ => None,
        })
    }
}

impl ChatView for Transcript {
    fn render_document_info(&mut self, label: DocumentLabel) {
        self.info = Some(label);
    }

    fn set_viewer_source(&mut self, source: &str) {
        self.viewer_source = Some(source.to_string());
    }

    fn hide_welcome(&mut self) {
        self.welcome_visible = false;
    }

    fn read_input(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn append_entry(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot::Entry {
            id,
            entry,
            details_shown: false,
            toggle_label: SHOW_DETAILS.to_string(),
        });
        id
    }

    fn show_loading(&mut self) {
        self.slots.push(Slot::Loading);
    }

    fn hide_loading(&mut self) {
        if let Some(pos) = self.slots.iter().position(|s| matches!(s, Slot::Loading)) {
            self.slots.remove(pos);
        }
    }

    fn details_shown(&self, id: EntryId) -> Option<bool> {
        self.slots.iter().find_map(|s| match s {
            Slot::Entry {
                id: eid,
                entry: Entry::Answer { .. },
                details_shown,
                ..
            } if *eid == id => Some(*details_shown),
            _ => None,
        })
    }

    fn set_details(&mut self, id: EntryId, shown: bool, label: &str) {
        for slot in &mut self.slots {
            if let Slot::Entry {
                id: eid,
                details_shown,
                toggle_label,
                ..
            } = slot
            {
                if *eid == id {
                    *details_shown = shown;
                    *toggle_label = label.to_string();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_join_sources() {
        let details = Details::new("0.50".to_string(), &["a".to_string(), "b".to_string()]);
        assert_eq!(details.sources, "a, b");
        assert_eq!(details.lines()[0], "Time: 0.50s");
    }

    #[test]
    fn test_details_placeholder_when_no_sources() {
        let details = Details::new("0.01".to_string(), &[]);
        assert_eq!(details.lines()[1], "Sources: No sources");
    }

    #[test]
    fn test_hide_loading_removes_only_loading_slot() {
        let mut t = Transcript::new();
        t.append_entry(Entry::Question("q".to_string()));
        t.show_loading();
        assert!(t.is_loading());
        t.hide_loading();
        assert!(!t.is_loading());
        assert_eq!(t.len(), 1);
        // Second call is harmless
        t.hide_loading();
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_question_entries_have_no_panel() {
        let mut t = Transcript::new();
        let id = t.append_entry(Entry::Question("q".to_string()));
        assert_eq!(t.details_shown(id), None);
        assert_eq!(t.toggle_label(id), None);
    }

    #[test]
    fn test_document_label_display() {
        assert_eq!(
            DocumentLabel::Document("guide.pdf".to_string()).to_string(),
            "Document: guide.pdf"
        );
        assert_eq!(
            DocumentLabel::Error("No PDF file found".to_string()).to_string(),
            "Error: No PDF file found"
        );
    }
}
