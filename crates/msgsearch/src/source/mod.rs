//! Message sources
//!
//! The engine never owns a corpus; it asks a [`MessageSource`] for the full
//! message set of one conversation on every search and filters locally.

mod json;
mod memory;

pub use json::JsonMessageSource;
pub use memory::InMemoryMessageSource;

use anyhow::Result;

use crate::models::{ConversationId, Message};

/// Bulk provider of the messages visible for a conversation
///
/// No server-side filtering or pagination is assumed. Implementations may
/// block on I/O; timeouts belong to the implementation.
pub trait MessageSource: Send + Sync {
    /// Fetch every message of the conversation.
    ///
    /// An unknown conversation is an empty list, not an error.
    fn fetch_messages(&self, conversation: &ConversationId) -> Result<Vec<Message>>;
}
