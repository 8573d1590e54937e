use serde::{Deserialize, Serialize};

use crate::directive::Directive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Field names follow the backend history payload so a
/// snapshot serializes the same way it arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    #[serde(rename = "link", default)]
    pub is_navigation: bool,
    #[serde(rename = "button", default)]
    pub is_activation: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            is_navigation: false,
            is_activation: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            is_navigation: false,
            is_activation: false,
        }
    }

    pub fn with_flags(mut self, is_navigation: bool, is_activation: bool) -> Self {
        self.is_navigation = is_navigation;
        self.is_activation = is_activation;
        self
    }

    pub fn directive(&self) -> Option<Directive> {
        Directive::from_flags(&self.text, self.is_navigation, self.is_activation)
    }
}

/// Complete ordered transcript returned by a history query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    messages: Vec<Message>,
}

impl Snapshot {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Serialized form used for change detection. Two snapshots are the same
    /// transcript iff their signatures are equal.
    pub fn signature(&self) -> String {
        // Serializing plain strings and bools into a String cannot fail.
        serde_json::to_string(&self.messages).unwrap_or_default()
    }
}

impl From<Vec<Message>> for Snapshot {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages)
    }
}
