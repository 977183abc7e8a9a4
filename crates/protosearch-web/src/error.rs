//! Errors raised while mounting the search UI in the browser.

use protosearch_core::CoreError;
use protosearch_ui::SetupError;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Result type for browser mounting.
pub type Result<T> = std::result::Result<T, MountError>;

#[derive(Debug, Error)]
pub enum MountError {
    /// Not running in a window with a document.
    #[error("no window or document")]
    NoDocument,

    /// The script URL is not absolute.
    #[error("invalid script URL: {0}")]
    ScriptUrl(#[from] url::ParseError),

    /// Page attributes or options could not be read.
    #[error("invalid {what}: {message}")]
    Input { what: &'static str, message: String },

    /// A DOM call failed.
    #[error("DOM error: {0}")]
    Dom(String),

    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Setup(#[from] SetupError),
}

impl MountError {
    pub fn input(what: &'static str, message: impl ToString) -> Self {
        Self::Input {
            what,
            message: message.to_string(),
        }
    }
}

impl From<MountError> for JsValue {
    fn from(err: MountError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = MountError::input("options", "expected a map");
        assert_eq!(err.to_string(), "invalid options: expected a map");
    }

    #[test]
    fn test_setup_error_is_transparent() {
        let err: MountError = SetupError::NoSurface.into();
        assert_eq!(err.to_string(), "no search surface found on the page");
    }
}
