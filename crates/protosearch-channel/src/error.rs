//! Error types for the query channel and the search worker.

use thiserror::Error;

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;

/// Errors seen by the page side of the channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The channel was disposed and its worker terminated.
    #[error("query channel disposed")]
    Disposed,

    /// The worker stopped accepting requests.
    #[error("search worker is gone")]
    WorkerGone,

    /// The worker could not be started.
    #[error("failed to spawn search worker: {0}")]
    Spawn(String),

    /// The worker resource URL could not be built.
    #[error("invalid worker URL: {0}")]
    WorkerUrl(#[from] url::ParseError),
}

impl ChannelError {
    /// Create a spawn error from any displayable cause.
    pub fn spawn(cause: impl std::fmt::Display) -> Self {
        Self::Spawn(cause.to_string())
    }
}

/// Failures while fetching or decoding the index inside the worker.
///
/// A load error is final for the lifetime of the worker.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The `index` parameter is not a plain file base name.
    #[error("invalid index name: {0:?}")]
    InvalidIndexName(String),

    /// The index resource could not be fetched.
    #[error("failed to fetch {location}: {message}")]
    Fetch { location: String, message: String },

    /// The engine rejected the index bytes.
    #[error("failed to decode index: {0}")]
    Decode(String),
}

impl LoadError {
    /// Create a fetch error.
    pub fn fetch(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// A single query failed inside the engine.
#[derive(Debug, Error)]
#[error("query failed: {0}")]
pub struct QueryError(pub String);
