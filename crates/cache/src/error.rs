use thiserror::Error;

/// Errors surfaced to cache callers.
///
/// Cloneable so that one fetch failure can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("fetch for {key} failed: {message}")]
    Fetch { key: String, message: String },

    #[error("fetch for {key} was aborted")]
    FetchAborted { key: String },
}
