//! Skin-level options: DOM anchors and status markup.

use serde::{Deserialize, Serialize};

/// Element ids and classes the controller binds to.
///
/// The modal surface needs `modal`, `modal_input`, `modal_body` and
/// `modal_trigger`; the close control is optional. The inline surface needs
/// `results` and `search_input`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anchors {
    /// Modal container, also the backdrop that closes the modal on click.
    pub modal: String,
    /// Search input inside the modal.
    pub modal_input: String,
    /// Results container inside the modal.
    pub modal_body: String,
    /// Element opening the modal on click.
    pub modal_trigger: String,
    /// Class of the control closing the modal.
    pub close_class: String,
    /// Results container of the inline surface.
    pub results: String,
    /// Search input of the inline surface.
    pub search_input: String,
}

impl Default for Anchors {
    fn default() -> Self {
        Self {
            modal: "search-modal".to_string(),
            modal_input: "search-modal-input".to_string(),
            modal_body: "search-modal-content-body".to_string(),
            modal_trigger: "search-top-bar".to_string(),
            close_class: "search-close".to_string(),
            results: "search-results".to_string(),
            search_input: "search-input".to_string(),
        }
    }
}

/// Options of the search UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiOptions {
    /// DOM anchors.
    #[serde(default)]
    pub anchors: Anchors,

    /// Shown when a query matched nothing.
    #[serde(default = "default_no_results")]
    pub no_results_markup: String,

    /// Shown while the index is still loading.
    #[serde(default = "default_loading")]
    pub loading_markup: String,

    /// Shown when the index failed to load.
    #[serde(default = "default_unavailable")]
    pub unavailable_markup: String,

    /// Shown in a freshly reset modal.
    #[serde(default = "default_placeholder")]
    pub placeholder_markup: String,

    /// Clear the modal input and results each time the modal opens.
    #[serde(default)]
    pub reset_on_open: bool,
}

fn default_no_results() -> String {
    r#"<p class="ps-status ps-no-results">No results found</p>"#.to_string()
}

fn default_loading() -> String {
    r#"<p class="ps-status ps-loading">Loading search index...</p>"#.to_string()
}

fn default_unavailable() -> String {
    r#"<p class="ps-status ps-unavailable">Search is unavailable</p>"#.to_string()
}

fn default_placeholder() -> String {
    r#"<p class="ps-status">Type to search...</p>"#.to_string()
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            anchors: Anchors::default(),
            no_results_markup: default_no_results(),
            loading_markup: default_loading(),
            unavailable_markup: default_unavailable(),
            placeholder_markup: default_placeholder(),
            reset_on_open: false,
        }
    }
}
