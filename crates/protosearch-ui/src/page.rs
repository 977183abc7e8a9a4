//! The slice of the DOM the controller needs.
//!
//! [`Page`] is implemented over `web_sys` in the browser bindings and by
//! [`MemoryPage`] for tests and headless use.

use std::collections::{BTreeSet, HashMap};

/// DOM operations used by the search controller. Unknown ids are ignored.
pub trait Page {
    /// Whether an element with this id exists.
    fn has_element(&self, id: &str) -> bool;

    /// Whether at least one element carries this class.
    fn has_class(&self, class: &str) -> bool;

    /// Replace the content of an element.
    fn set_inner_html(&mut self, id: &str, html: &str);

    /// Set the value of an input element.
    fn set_value(&mut self, id: &str, value: &str);

    /// Move keyboard focus to an element.
    fn focus(&mut self, id: &str);

    /// Show or hide an element.
    fn set_visible(&mut self, id: &str, visible: bool);

    /// Report a diagnostic the site author can see.
    fn report_error(&mut self, message: &str);
}

impl<P: Page + ?Sized> Page for &mut P {
    fn has_element(&self, id: &str) -> bool {
        (**self).has_element(id)
    }

    fn has_class(&self, class: &str) -> bool {
        (**self).has_class(class)
    }

    fn set_inner_html(&mut self, id: &str, html: &str) {
        (**self).set_inner_html(id, html);
    }

    fn set_value(&mut self, id: &str, value: &str) {
        (**self).set_value(id, value);
    }

    fn focus(&mut self, id: &str) {
        (**self).focus(id);
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        (**self).set_visible(id, visible);
    }

    fn report_error(&mut self, message: &str) {
        (**self).report_error(message);
    }
}

#[derive(Debug, Clone, Default)]
struct Element {
    inner_html: String,
    value: String,
    visible: bool,
}

/// In-memory page.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    elements: HashMap<String, Element>,
    classes: BTreeSet<String>,
    focused: Option<String>,
    errors: Vec<String>,
}

impl MemoryPage {
    /// Create an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hidden, empty element.
    pub fn with_element(mut self, id: impl Into<String>) -> Self {
        self.elements.insert(id.into(), Element::default());
        self
    }

    /// Mark a class as present on the page.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    /// Content of an element.
    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.inner_html.as_str())
    }

    /// Value of an input element.
    pub fn value(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.value.as_str())
    }

    /// Whether an element is shown.
    pub fn is_visible(&self, id: &str) -> bool {
        self.elements.get(id).is_some_and(|e| e.visible)
    }

    /// Id of the focused element.
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Reported diagnostics.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl Page for MemoryPage {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn set_inner_html(&mut self, id: &str, html: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.inner_html = html.to_string();
        }
    }

    fn set_value(&mut self, id: &str, value: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.value = value.to_string();
        }
    }

    fn focus(&mut self, id: &str) {
        if self.elements.contains_key(id) {
            self.focused = Some(id.to_string());
        }
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            element.visible = visible;
        }
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_page_ignores_unknown_ids() {
        let mut page = MemoryPage::new().with_element("results");
        page.set_inner_html("missing", "<p>x</p>");
        page.focus("missing");

        assert_eq!(page.inner_html("missing"), None);
        assert_eq!(page.focused(), None);
    }

    #[test]
    fn test_memory_page_state() {
        let mut page = MemoryPage::new().with_element("input").with_class("search-close");
        page.set_value("input", "rust");
        page.set_visible("input", true);
        page.focus("input");

        assert_eq!(page.value("input"), Some("rust"));
        assert!(page.is_visible("input"));
        assert_eq!(page.focused(), Some("input"));
        assert!(page.has_class("search-close"));
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn write(mut page: impl Page) {
            page.set_inner_html("results", "<p>ok</p>");
            page.report_error("boom");
        }

        let mut page = MemoryPage::new().with_element("results");
        write(&mut page);
        assert_eq!(page.inner_html("results"), Some("<p>ok</p>"));
        assert_eq!(page.errors(), ["boom".to_string()]);
    }
}
