//! Message model representing a single chat message in a conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of the conversation (chat or dispute) a message set belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of message content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    File,
    /// Emoji or sticker
    Emoji,
}

impl MessageType {
    /// Parse a loosely-spelled type name as produced by message transports
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Some(MessageType::Text),
            "image" | "img" | "picture" => Some(MessageType::Image),
            "file" | "attachment" => Some(MessageType::File),
            "emoji" | "sticker" => Some(MessageType::Emoji),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::File => "file",
            MessageType::Emoji => "emoji",
        }
    }
}

/// Role of a message sender within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Customer,
    Merchant,
    Support,
    System,
}

impl SenderRole {
    /// Parse a role name, normalizing common aliases.
    ///
    /// Unknown roles are treated as customers.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "merchant" | "seller" | "shop" => SenderRole::Merchant,
            "support" | "admin" | "agent" | "service" => SenderRole::Support,
            "system" => SenderRole::System,
            _ => SenderRole::Customer,
        }
    }

    /// Human-readable label used in suggestions
    pub fn label(&self) -> &'static str {
        match self {
            SenderRole::Customer => "Customer",
            SenderRole::Merchant => "Merchant",
            SenderRole::Support => "Support",
            SenderRole::System => "System",
        }
    }
}

/// Summary of who sent a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Stable sender identifier, used by sender filters
    pub id: String,
    /// Display name shown in the UI and used for sender sorting
    pub name: String,
    pub role: SenderRole,
}

impl Sender {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: SenderRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

/// A single message within a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Text content; for non-text messages this is the caption or file name
    pub content: String,
    pub message_type: MessageType,
    pub sender: Sender,
    /// When the message was sent
    pub sent_at: DateTime<Utc>,
    /// Whether the current actor authored this message
    pub is_own: bool,
    /// Whether the message was retracted by its author
    #[serde(default)]
    pub is_recalled: bool,
}

impl Message {
    /// Create a new message builder
    pub fn builder(id: MessageId) -> MessageBuilder {
        MessageBuilder::new(id)
    }
}

/// Builder for creating Message instances
pub struct MessageBuilder {
    id: MessageId,
    content: String,
    message_type: MessageType,
    sender: Option<Sender>,
    sent_at: Option<DateTime<Utc>>,
    is_own: bool,
    is_recalled: bool,
}

impl MessageBuilder {
    fn new(id: MessageId) -> Self {
        Self {
            id,
            content: String::new(),
            message_type: MessageType::Text,
            sender: None,
            sent_at: None,
            is_own: false,
            is_recalled: false,
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    pub fn sender(mut self, sender: Sender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn sent_at(mut self, sent_at: DateTime<Utc>) -> Self {
        self.sent_at = Some(sent_at);
        self
    }

    pub fn own(mut self, is_own: bool) -> Self {
        self.is_own = is_own;
        self
    }

    pub fn recalled(mut self, is_recalled: bool) -> Self {
        self.is_recalled = is_recalled;
        self
    }

    pub fn build(self) -> Message {
        Message {
            id: self.id,
            content: self.content,
            message_type: self.message_type,
            sender: self
                .sender
                .unwrap_or_else(|| Sender::new("unknown", "Unknown", SenderRole::Customer)),
            sent_at: self.sent_at.unwrap_or_else(Utc::now),
            is_own: self.is_own,
            is_recalled: self.is_recalled,
        }
    }
}
