//! Domain models for chat messages and search filters

mod filters;
mod message;
mod raw;

pub use filters::{DateRange, SearchFilters};
pub use message::{ConversationId, Message, MessageBuilder, MessageId, MessageType, Sender, SenderRole};
pub use raw::{
    MessageValidationError, RawId, RawMessage, RawSender, RawTimestamp, validate_messages,
};
