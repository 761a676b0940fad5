//! In-memory message source

use anyhow::{Result, anyhow, bail};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::MessageSource;
use crate::models::{ConversationId, Message};

/// Message source holding conversations in memory
///
/// Mainly used by tests and by hosts that already hold the loaded message
/// list. [`set_unavailable`](Self::set_unavailable) makes every fetch fail,
/// which simulates a transport outage.
pub struct InMemoryMessageSource {
    conversations: RwLock<HashMap<String, Vec<Message>>>,
    unavailable: AtomicBool,
}

impl InMemoryMessageSource {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Create a source holding a single conversation
    pub fn with_conversation(conversation: &ConversationId, messages: Vec<Message>) -> Self {
        let source = Self::new();
        source.replace_messages(conversation, messages);
        source
    }

    /// Append messages to a conversation
    pub fn insert_messages(&self, conversation: &ConversationId, messages: Vec<Message>) {
        if let Ok(mut conversations) = self.conversations.write() {
            conversations
                .entry(conversation.0.clone())
                .or_default()
                .extend(messages);
        }
    }

    /// Replace the whole message list of a conversation
    pub fn replace_messages(&self, conversation: &ConversationId, messages: Vec<Message>) {
        if let Ok(mut conversations) = self.conversations.write() {
            conversations.insert(conversation.0.clone(), messages);
        }
    }

    /// Toggle simulated outage
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Default for InMemoryMessageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSource for InMemoryMessageSource {
    fn fetch_messages(&self, conversation: &ConversationId) -> Result<Vec<Message>> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("message source offline");
        }
        let conversations = self
            .conversations
            .read()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        Ok(conversations
            .get(conversation.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageId;

    fn msg(id: &str) -> Message {
        Message::builder(MessageId::new(id)).content(id).build()
    }

    #[test]
    fn test_fetch_unknown_conversation_is_empty() {
        let source = InMemoryMessageSource::new();
        let messages = source.fetch_messages(&ConversationId::new("c1")).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn test_insert_appends() {
        let conv = ConversationId::new("c1");
        let source = InMemoryMessageSource::with_conversation(&conv, vec![msg("1")]);
        source.insert_messages(&conv, vec![msg("2")]);

        let messages = source.fetch_messages(&conv).unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_unavailable_fails() {
        let conv = ConversationId::new("c1");
        let source = InMemoryMessageSource::with_conversation(&conv, vec![msg("1")]);
        source.set_unavailable(true);
        assert!(source.fetch_messages(&conv).is_err());

        source.set_unavailable(false);
        assert_eq!(source.fetch_messages(&conv).unwrap().len(), 1);
    }
}
