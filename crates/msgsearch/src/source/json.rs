//! JSON-file message source
//!
//! Reads one `<conversation>.json` file per conversation from a directory.
//! Each file holds an array of loosely-typed message records, validated
//! into [`Message`]s on load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::MessageSource;
use crate::models::{ConversationId, Message, validate_messages};

pub struct JsonMessageSource {
    root: PathBuf,
}

impl JsonMessageSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Parse a JSON array of raw messages, dropping records that fail validation.
    ///
    /// Only a document that is not a JSON array is an error. Each element is
    /// validated on its own, so a record with wrongly typed fields is dropped
    /// without affecting the rest.
    pub fn parse(json: &str) -> Result<Vec<Message>> {
        let records: Vec<serde_json::Value> =
            serde_json::from_str(json).context("Failed to parse message list JSON")?;
        Ok(validate_messages(records))
    }

    fn conversation_path(&self, conversation: &ConversationId) -> PathBuf {
        self.root.join(format!("{}.json", conversation.as_str()))
    }
}

impl MessageSource for JsonMessageSource {
    fn fetch_messages(&self, conversation: &ConversationId) -> Result<Vec<Message>> {
        let id = conversation.as_str();
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            bail!("Invalid conversation id: {:?}", id);
        }

        let path = self.conversation_path(conversation);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read messages: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid message file: {}", path.display()))
    }
}
