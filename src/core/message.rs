//! Conversation data model: messages, their source, and the per-chat message log.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder title of a conversation before topic identification.
pub const UNTITLED: &str = "Chat";

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    User,
    Backend,
    Data,
    Gemini,
    Error,
}

impl MessageSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageSource::User => "user",
            MessageSource::Backend => "backend",
            MessageSource::Data => "data",
            MessageSource::Gemini => "gemini",
            MessageSource::Error => "error",
        }
    }
}

impl std::fmt::Display for MessageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
}

/// A single chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    text: String,
    #[serde(rename = "isBot")]
    is_bot: bool,
    source: MessageSource,
    #[serde(rename = "type", default)]
    kind: MessageKind,
}

impl Message {
    pub fn new(text: impl Into<String>, is_bot: bool, source: MessageSource) -> Self {
        Message {
            id: Uuid::new_v4(),
            text: text.into(),
            is_bot,
            source,
            kind: MessageKind::Text,
        }
    }

    /// A message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Message::new(text, false, MessageSource::User)
    }

    /// A reply from one of the bot sources.
    pub fn bot(text: impl Into<String>, source: MessageSource) -> Self {
        Message::new(text, true, source)
    }

    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    pub fn source(&self) -> MessageSource {
        self.source
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }
}

/// A chat session: a title and an append-only message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    id: Uuid,
    title: String,
    #[serde(default)]
    title_assigned: bool,
    messages: Vec<Message>,
}

impl Default for Conversation {
    fn default() -> Self {
        Conversation::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Conversation {
            id: Uuid::new_v4(),
            title: UNTITLED.to_string(),
            title_assigned: false,
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Title derived from the id, used when topic identification yields nothing.
    pub fn fallback_title(&self) -> String {
        let id = self.id.to_string();
        format!("Chat_{}", &id[..5])
    }

    /// Set the title from the first exchange's topic. Only the first call takes
    /// effect; a blank topic falls back to [`Conversation::fallback_title`].
    /// Returns whether the title changed.
    pub fn assign_title(&mut self, topic: &str) -> bool {
        if self.title_assigned {
            log::debug!("Conversation {} already titled; ignoring topic", self.id);
            return false;
        }
        let topic = topic.trim();
        self.title = if topic.is_empty() {
            self.fallback_title()
        } else {
            topic.to_string()
        };
        self.title_assigned = true;
        true
    }

    /// Explicit rename by the user.
    pub fn rename(&mut self, title: &str) {
        self.title = title.trim().to_string();
        self.title_assigned = true;
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a user message and a bot reply, skipping whichever is blank.
    pub fn record_exchange(&mut self, user_text: &str, bot_text: &str, source: MessageSource) {
        if !user_text.trim().is_empty() {
            self.push(Message::user(user_text));
        }
        if !bot_text.trim().is_empty() {
            self.push(Message::bot(bot_text, source));
        }
    }

    /// Append a user notice listing uploaded files. No-op for an empty list.
    pub fn record_files(&mut self, names: &[&str]) {
        if names.is_empty() {
            return;
        }
        self.push(Message::user(format!("Sent files: {}", names.join(", "))));
    }
}
