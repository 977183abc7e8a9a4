//! Error types for the Protosearch core library.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for Protosearch.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Page configuration could not be resolved.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A renderer name was referenced that was never registered.
    #[error("Unknown renderer: {0}")]
    UnknownRenderer(String),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new unknown renderer error.
    pub fn unknown_renderer(name: impl Into<String>) -> Self {
        Self::UnknownRenderer(name.into())
    }
}
