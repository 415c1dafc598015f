use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Two-valued UI theme flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub text: String,
    pub sender: Sender,
}

/// Append-only list of chat messages for one view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    last_id: i64,
}

impl Transcript {
    /// Append a message stamped with the current time in milliseconds,
    /// bumped so ids stay strictly increasing.
    pub fn push(&mut self, text: impl Into<String>, sender: Sender) -> ChatMessage {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        let message = ChatMessage {
            id,
            text: text.into(),
            sender,
        };
        self.messages.push(message.clone());
        message
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
