use crate::models::{Message, SearchFilters};

/// Whether `message` satisfies every constraint in `filters`.
///
/// The keyword is not consulted here; keyword matching happens after
/// filtering.
pub fn passes(message: &Message, filters: &SearchFilters) -> bool {
    if filters.own_messages_only && !message.is_own {
        return false;
    }
    if !filters.include_recalled && message.is_recalled {
        return false;
    }
    if !filters.message_types.is_empty() && !filters.message_types.contains(&message.message_type)
    {
        return false;
    }
    if !filters.senders.is_empty() && !filters.senders.contains(&message.sender.id) {
        return false;
    }
    if let Some(range) = &filters.date_range
        && !range.contains(&message.sent_at)
    {
        return false;
    }
    true
}
