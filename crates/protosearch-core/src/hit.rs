//! Search hits as produced by the external query engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stored field holding the site-relative document path.
pub const FIELD_PATH: &str = "path";
/// Stored field holding the document title.
pub const FIELD_TITLE: &str = "title";
/// Stored field holding the document body.
pub const FIELD_BODY: &str = "body";

/// One ranked search result.
///
/// Hits are read-only for the coordinator. Highlights already contain the
/// engine's emphasis markup and are rendered verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hit {
    /// Raw stored document fields.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    /// Highlighted excerpts, possibly missing for some fields.
    #[serde(default)]
    pub highlights: BTreeMap<String, String>,

    /// Relevance score on the engine's own scale.
    #[serde(default)]
    pub score: f64,
}

impl Hit {
    /// Create a hit with the given score and no fields.
    pub fn new(score: f64) -> Self {
        Self {
            score,
            ..Self::default()
        }
    }

    /// Add a stored field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a highlighted excerpt.
    pub fn with_highlight(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.highlights.insert(name.into(), value.into());
        self
    }

    /// Get a stored field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Get a highlighted excerpt.
    pub fn highlight(&self, name: &str) -> Option<&str> {
        self.highlights.get(name).map(String::as_str)
    }

    /// The highlight for `name` if present, otherwise the raw field.
    pub fn highlighted_or_field(&self, name: &str) -> Option<&str> {
        self.highlight(name).or_else(|| self.field(name))
    }

    /// Document path with any leading `/` removed.
    pub fn relative_path(&self) -> &str {
        let path = self.field(FIELD_PATH).unwrap_or_default();
        path.strip_prefix('/').unwrap_or(path)
    }
}
