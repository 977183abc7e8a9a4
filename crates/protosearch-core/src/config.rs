//! Page configuration resolution.
//!
//! A [`Config`] is built once per page load from the attributes declared on the
//! search script element and the query string of the page URL. It is never
//! mutated afterwards; share it behind an `Arc`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::{Url, form_urlencoded};

use crate::error::{CoreError, Result};

/// Page attribute enabling the score line in rendered hits.
pub const ATTR_SHOW_SCORE: &str = "show-score";
/// Page attribute enabling the document path in rendered hits.
pub const ATTR_SHOW_PATH: &str = "show-path";
/// Page attribute disabling the preview excerpt when set to `"false"`.
pub const ATTR_SHOW_PREVIEW: &str = "show-preview";
/// Page attribute naming the renderer.
pub const ATTR_RENDERER: &str = "renderer";
/// Page attribute making the modal surface run the initial URL query.
pub const ATTR_MODAL_AUTORUN: &str = "modal-autorun";

/// URL parameter carrying the initial query.
pub const PARAM_QUERY: &str = "q";
/// URL parameter overriding the renderer.
pub const PARAM_RENDERER: &str = "renderer";
/// URL parameter naming the index file, forwarded to the worker.
pub const PARAM_INDEX: &str = "index";

/// Attributes declared by the page on the search script element.
///
/// Keys are the attribute names without the `data-` prefix, e.g. `show-score`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageAttributes(BTreeMap<String, String>);

impl PageAttributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`PageAttributes::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get an attribute value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether the attribute is literally `"true"`.
    fn is_true(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }

    /// Whether the attribute is literally `"false"`.
    fn is_false(&self, name: &str) -> bool {
        self.get(name) == Some("false")
    }
}

impl<K, V> FromIterator<(K, V)> for PageAttributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Effective search configuration for one page load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    show_score: bool,
    show_path: bool,
    show_preview: bool,
    renderer: Option<String>,
    query: Option<String>,
    worker_params: String,
    base_url: Url,
    script_url: Url,
    modal_autorun: bool,
}

impl Config {
    /// Resolve the configuration from page attributes, the page URL query
    /// string (with or without the leading `?`) and the URL of the executing
    /// search script.
    ///
    /// URL parameters win over page attributes. Only the `index` parameter is
    /// forwarded to the worker; everything else is dropped.
    pub fn resolve(attributes: &PageAttributes, query_string: &str, script_url: &Url) -> Result<Self> {
        let params = UrlParams::parse(query_string);

        let base_url = script_url.join("../").map_err(|e| {
            CoreError::config_with_source(
                format!("Cannot derive base URL from script location: {script_url}"),
                e,
            )
        })?;

        let renderer = params
            .get(PARAM_RENDERER)
            .or_else(|| attributes.get(ATTR_RENDERER).filter(|v| !v.is_empty()))
            .map(str::to_string);

        let config = Self {
            show_score: attributes.is_true(ATTR_SHOW_SCORE),
            show_path: attributes.is_true(ATTR_SHOW_PATH),
            show_preview: !attributes.is_false(ATTR_SHOW_PREVIEW),
            renderer,
            query: params.get(PARAM_QUERY).map(str::to_string),
            worker_params: worker_params(&params),
            base_url,
            script_url: script_url.clone(),
            modal_autorun: attributes.is_true(ATTR_MODAL_AUTORUN),
        };

        tracing::debug!(
            renderer = ?config.renderer,
            query = ?config.query,
            worker_params = %config.worker_params,
            "Resolved search configuration"
        );

        Ok(config)
    }

    /// Resolve from a full page URL, using its query component.
    pub fn resolve_for_page(attributes: &PageAttributes, page_url: &Url, script_url: &Url) -> Result<Self> {
        Self::resolve(attributes, page_url.query().unwrap_or_default(), script_url)
    }

    pub fn show_score(&self) -> bool {
        self.show_score
    }

    pub fn show_path(&self) -> bool {
        self.show_path
    }

    pub fn show_preview(&self) -> bool {
        self.show_preview
    }

    /// Requested renderer name; `None` selects the registry default.
    pub fn renderer(&self) -> Option<&str> {
        self.renderer.as_deref()
    }

    /// Initial query from the `q` URL parameter.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Parameter string for the worker resource URL, empty when nothing is
    /// forwarded.
    pub fn worker_params(&self) -> &str {
        &self.worker_params
    }

    /// Base for result links, one directory above the search script.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Location of the search script.
    pub fn script_url(&self) -> &Url {
        &self.script_url
    }

    /// Whether the modal surface pre-fills and runs the initial query.
    pub fn modal_autorun(&self) -> bool {
        self.modal_autorun
    }

    /// Resolve a site-relative document path against [`Config::base_url`].
    ///
    /// Falls back to the raw path if it cannot be joined.
    pub fn link_for(&self, path: &str) -> String {
        match self.base_url.join(path) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(path, error = %e, "Cannot resolve result link");
                path.to_string()
            }
        }
    }
}

/// First-value-wins view of a URL query string.
struct UrlParams(Vec<(String, String)>);

impl UrlParams {
    fn parse(query_string: &str) -> Self {
        let query_string = query_string.strip_prefix('?').unwrap_or(query_string);
        Self(
            form_urlencoded::parse(query_string.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    /// First non-empty value for `name`.
    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// Copy the whitelisted `index` parameter into a fresh parameter string.
fn worker_params(params: &UrlParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if let Some(index) = params.get(PARAM_INDEX) {
        serializer.append_pair(PARAM_INDEX, index);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_url() -> Url {
        Url::parse("https://example.com/docs/search/search.js").unwrap()
    }

    #[test]
    fn test_display_toggles_from_attributes() {
        let attrs = PageAttributes::new()
            .with(ATTR_SHOW_SCORE, "true")
            .with(ATTR_SHOW_PREVIEW, "false");

        let config = Config::resolve(&attrs, "", &script_url()).unwrap();

        assert!(config.show_score());
        assert!(!config.show_preview());
        assert!(!config.show_path());
    }

    #[test]
    fn test_display_toggle_defaults() {
        let config = Config::resolve(&PageAttributes::new(), "", &script_url()).unwrap();

        assert!(!config.show_score());
        assert!(!config.show_path());
        assert!(config.show_preview());
        assert!(!config.modal_autorun());
        assert!(config.renderer().is_none());
        assert!(config.query().is_none());
    }

    #[test]
    fn test_only_literal_true_enables_toggle() {
        let attrs = PageAttributes::new()
            .with(ATTR_SHOW_SCORE, "TRUE")
            .with(ATTR_SHOW_PATH, "yes")
            .with(ATTR_SHOW_PREVIEW, "no");

        let config = Config::resolve(&attrs, "", &script_url()).unwrap();

        assert!(!config.show_score());
        assert!(!config.show_path());
        assert!(config.show_preview());
    }

    #[test]
    fn test_url_params_override_renderer() {
        let attrs = PageAttributes::new().with(ATTR_RENDERER, "scaladoc");

        let config = Config::resolve(&attrs, "?q=rust&renderer=docs", &script_url()).unwrap();

        assert_eq!(config.query(), Some("rust"));
        assert_eq!(config.renderer(), Some("docs"));
    }

    #[test]
    fn test_renderer_from_attribute() {
        let attrs = PageAttributes::new().with(ATTR_RENDERER, "cards");
        let config = Config::resolve(&attrs, "q=x", &script_url()).unwrap();
        assert_eq!(config.renderer(), Some("cards"));
    }

    #[test]
    fn test_query_never_read_from_attributes() {
        let attrs = PageAttributes::new().with("q", "from-page");
        let config = Config::resolve(&attrs, "", &script_url()).unwrap();
        assert!(config.query().is_none());
    }

    #[test]
    fn test_query_is_percent_decoded() {
        let config = Config::resolve(&PageAttributes::new(), "q=hello+world%21", &script_url()).unwrap();
        assert_eq!(config.query(), Some("hello world!"));
    }

    #[test]
    fn test_worker_params_whitelist_index() {
        let config = Config::resolve(
            &PageAttributes::new(),
            "?q=rust&index=api&evil=%3Cscript%3E&renderer=docs",
            &script_url(),
        )
        .unwrap();

        assert_eq!(config.worker_params(), "index=api");
    }

    #[test]
    fn test_worker_params_empty_without_index() {
        let config = Config::resolve(&PageAttributes::new(), "q=rust", &script_url()).unwrap();
        assert_eq!(config.worker_params(), "");
    }

    #[test]
    fn test_worker_params_reencodes_index() {
        let config = Config::resolve(&PageAttributes::new(), "index=my%20docs", &script_url()).unwrap();
        assert_eq!(config.worker_params(), "index=my+docs");
    }

    #[test]
    fn test_first_param_wins() {
        let config = Config::resolve(&PageAttributes::new(), "q=first&q=second", &script_url()).unwrap();
        assert_eq!(config.query(), Some("first"));
    }

    #[test]
    fn test_base_url_is_parent_of_script_directory() {
        let config = Config::resolve(&PageAttributes::new(), "", &script_url()).unwrap();
        assert_eq!(config.base_url().as_str(), "https://example.com/docs/");
        assert_eq!(config.link_for("a.html"), "https://example.com/docs/a.html");
    }

    #[test]
    fn test_resolve_for_page_uses_query_component() {
        let page = Url::parse("https://example.com/docs/search.html?q=worker&index=api").unwrap();
        let config = Config::resolve_for_page(&PageAttributes::new(), &page, &script_url()).unwrap();

        assert_eq!(config.query(), Some("worker"));
        assert_eq!(config.worker_params(), "index=api");
    }

    #[test]
    fn test_script_url_without_base_is_config_error() {
        let script = Url::parse("data:text/javascript,void(0)").unwrap();
        let result = Config::resolve(&PageAttributes::new(), "", &script);

        assert!(matches!(result, Err(CoreError::Config { .. })));
    }

    #[test]
    fn test_modal_autorun_attribute() {
        let attrs = PageAttributes::new().with(ATTR_MODAL_AUTORUN, "true");
        let config = Config::resolve(&attrs, "", &script_url()).unwrap();
        assert!(config.modal_autorun());
    }

    #[test]
    fn test_attributes_deserialize_from_json() {
        let attrs: PageAttributes =
            serde_json::from_str(r#"{"show-path": "true", "renderer": "docs"}"#).unwrap();

        assert_eq!(attrs.get(ATTR_SHOW_PATH), Some("true"));
        assert_eq!(attrs.get(ATTR_RENDERER), Some("docs"));
    }
}
