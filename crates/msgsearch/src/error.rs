//! Errors surfaced to engine callers

/// Error returned by [`SearchEngine::execute`](crate::SearchEngine::execute)
///
/// Only upstream fetch failures escape the engine. Corrupt history, failed
/// history writes and malformed messages are absorbed where they occur.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search unavailable: {message}")]
    Unavailable { message: String },
}

impl SearchError {
    pub(crate) fn unavailable(err: anyhow::Error) -> Self {
        SearchError::Unavailable {
            message: format!("{:#}", err),
        }
    }
}
