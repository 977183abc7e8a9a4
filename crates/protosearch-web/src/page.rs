//! [`Page`] over the live DOM.

use protosearch_ui::Page;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

/// The document the search UI is mounted into.
#[derive(Debug, Clone)]
pub struct WebPage {
    document: Document,
}

impl WebPage {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The current window's document, if any.
    pub fn current() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn html_element(&self, id: &str) -> Option<HtmlElement> {
        self.element(id)?.dyn_into::<HtmlElement>().ok()
    }
}

impl Page for WebPage {
    fn has_element(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    fn has_class(&self, class: &str) -> bool {
        self.document.get_elements_by_class_name(class).length() > 0
    }

    fn set_inner_html(&mut self, id: &str, html: &str) {
        if let Some(element) = self.element(id) {
            element.set_inner_html(html);
        }
    }

    fn set_value(&mut self, id: &str, value: &str) {
        if let Some(input) = self.element(id).and_then(|e| e.dyn_into::<HtmlInputElement>().ok()) {
            input.set_value(value);
        }
    }

    fn focus(&mut self, id: &str) {
        if let Some(element) = self.html_element(id) {
            let _ = element.focus();
        }
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(element) = self.html_element(id) {
            let display = if visible { "block" } else { "none" };
            let _ = element.style().set_property("display", display);
        }
    }

    fn report_error(&mut self, message: &str) {
        web_sys::console::error_1(&JsValue::from_str(message));
    }
}
