use crate::directive::Directive;
use crate::message::{Message, Role, Snapshot};

/// Horizontal placement of a bubble relative to the reading direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Leading,
    Trailing,
}

impl From<Role> for Side {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Side::Trailing,
            Role::Assistant => Side::Leading,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Chat,
    /// Bracketed local notice, e.g. a directive that could not be carried out.
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub side: Side,
    pub text: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Unchanged,
    /// The visible list was rebuilt. `directives` are the directive entries
    /// found beyond the history already dispatched.
    Replaced { directives: Vec<Directive> },
}

/// Visible transcript plus the signature of the last rendered snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranscriptStore {
    entries: Vec<Entry>,
    /// Longest history seen so far; its directives have all been handed out.
    dispatched: Vec<Message>,
    signature: Option<String>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Rebuilds the visible list from `snapshot` unless it serializes the same
    /// as the last rendered one. Optimistic and diagnostic entries are dropped.
    ///
    /// Rendering follows arrival order, but directives are only returned for
    /// messages beyond the history already dispatched. A snapshot that is a
    /// strict prefix of that history is a late answer and leaves it alone.
    pub fn render(&mut self, snapshot: &Snapshot) -> RenderOutcome {
        let signature = snapshot.signature();
        if self.signature.as_deref() == Some(signature.as_str()) {
            return RenderOutcome::Unchanged;
        }

        let shared = self
            .dispatched
            .iter()
            .zip(snapshot.messages())
            .take_while(|(old, new)| old == new)
            .count();

        self.entries.clear();
        let mut directives = Vec::new();
        for (index, message) in snapshot.messages().iter().enumerate() {
            match message.directive() {
                Some(directive) => {
                    if index >= shared {
                        directives.push(directive);
                    }
                }
                None if message.text.trim().is_empty() => {}
                None => self.entries.push(Entry {
                    side: message.role.into(),
                    text: message.text.clone(),
                    kind: EntryKind::Chat,
                }),
            }
        }

        let stale = shared == snapshot.len() && snapshot.len() < self.dispatched.len();
        if !stale {
            self.dispatched = snapshot.messages().to_vec();
        }
        self.signature = Some(signature);
        RenderOutcome::Replaced { directives }
    }

    /// Optimistic local append, superseded by the next differing render.
    pub fn append(&mut self, message: &Message) {
        self.entries.push(Entry {
            side: message.role.into(),
            text: message.text.clone(),
            kind: EntryKind::Chat,
        });
    }

    pub fn append_diagnostic(&mut self, text: impl Into<String>) {
        self.entries.push(Entry {
            side: Side::Leading,
            text: text.into(),
            kind: EntryKind::Diagnostic,
        });
    }
}
