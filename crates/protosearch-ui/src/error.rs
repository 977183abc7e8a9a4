//! Setup errors for the search UI.

use protosearch_channel::ChannelError;
use thiserror::Error;

/// Result type for UI setup.
pub type Result<T> = std::result::Result<T, SetupError>;

/// Reasons the search UI could not be wired to the page.
#[derive(Debug, Error)]
pub enum SetupError {
    /// No renderer could be resolved from the registry.
    #[error("no renderer registered")]
    NoRenderer,

    /// Neither the modal nor the inline surface anchors exist.
    #[error("no search surface found on the page")]
    NoSurface,

    /// The query channel could not be opened.
    #[error("query channel error: {0}")]
    Channel(#[from] ChannelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_error_conversion() {
        let err: SetupError = ChannelError::spawn("no threads").into();
        assert!(err.to_string().contains("no threads"));
    }
}
