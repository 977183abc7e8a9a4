//! CLI command implementations.

pub mod render;
pub mod resolve;

use color_eyre::eyre::{Result, eyre};
use protosearch_core::PageAttributes;

/// Parse a `key=value` page attribute argument.
pub fn parse_attribute(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{arg}`")),
    }
}

/// Build page attributes from parsed `key=value` pairs.
pub fn attributes(pairs: &[(String, String)]) -> PageAttributes {
    pairs.iter().cloned().collect()
}

pub(crate) fn parse_url(kind: &str, value: &str) -> Result<url::Url> {
    url::Url::parse(value).map_err(|e| eyre!("Invalid {kind} URL `{value}`: {e}"))
}
