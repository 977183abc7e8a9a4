//! Mounting the search UI into the current document.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use protosearch_core::{Config, PageAttributes, RendererRegistry};
use protosearch_ui::{Disposition, KeyEvent, SearchUi, SurfaceKind, UiEvent, UiOptions};
use tracing::info;
use url::Url;
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{Element, Event, EventTarget, HtmlInputElement, KeyboardEvent};

use crate::{
    error::{MountError, Result},
    page::WebPage,
    spawner::{WebWorkerSpawner, describe},
};

type SharedUi = Rc<RefCell<SearchUi<WebPage>>>;

/// A mounted search UI.
#[wasm_bindgen]
pub struct SearchHandle {
    ui: SharedUi,
}

#[wasm_bindgen]
impl SearchHandle {
    /// `"modal"` or `"inline"`.
    pub fn surface(&self) -> String {
        match self.ui.borrow().surface_kind() {
            SurfaceKind::Modal => "modal".to_string(),
            SurfaceKind::Inline => "inline".to_string(),
        }
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.ui.borrow().is_open()
    }

    pub fn open(&self) {
        self.ui.borrow_mut().open();
    }

    pub fn close(&self) {
        self.ui.borrow_mut().close();
    }

    /// Terminate the worker. Later input is ignored.
    pub fn dispose(&self) {
        self.ui.borrow_mut().dispose();
    }
}

/// Mount with the built-in renderers.
///
/// `attributes` is a plain object or `dataset` of the script element; keys
/// may be kebab-case or camelCase. `options` is an optional `UiOptions`
/// object.
#[wasm_bindgen]
pub fn mount(script_url: &str, attributes: JsValue, options: JsValue) -> std::result::Result<SearchHandle, JsValue> {
    let attributes = attributes_from_js(attributes)?;
    let options = options_from_js(options)?;
    let registry = RendererRegistry::with_builtin_renderers();

    Ok(mount_with(script_url, &attributes, &registry, options)?)
}

/// Mount with a caller-provided registry.
pub fn mount_with(
    script_url: &str,
    attributes: &PageAttributes,
    registry: &RendererRegistry,
    options: UiOptions,
) -> Result<SearchHandle> {
    let window = web_sys::window().ok_or(MountError::NoDocument)?;
    let document = window.document().ok_or(MountError::NoDocument)?;

    let script_url = Url::parse(script_url)?;
    let search = window.location().search().unwrap_or_default();
    let config = Config::resolve(attributes, &search, &script_url)?;

    let anchors = options.anchors.clone();
    let spawner = WebWorkerSpawner::new();
    let ui = SearchUi::setup(
        WebPage::new(document.clone()),
        Arc::new(config),
        registry,
        &spawner,
        options,
    )?;
    let ui: SharedUi = Rc::new(RefCell::new(ui));

    let weak = Rc::downgrade(&ui);
    spawner.on_message(move || {
        if let Some(ui) = weak.upgrade() {
            ui.borrow_mut().pump();
        }
    });

    listen(&document, "input", route(&ui, input_event))?;
    listen(&window, "click", route(&ui, click_event))?;
    listen(&window, "keydown", route(&ui, key_event))?;

    // Clicks anywhere inside the trigger or a close control count as clicks on it.
    if ui.borrow().surface_kind() == SurfaceKind::Modal {
        if let Some(trigger) = document.get_element_by_id(&anchors.modal_trigger) {
            let event = UiEvent::click(anchors.modal_trigger.clone());
            listen(&trigger, "click", route(&ui, move |_: &Event| Some(event.clone())))?;
        }
        let closers = document.get_elements_by_class_name(&anchors.close_class);
        for i in 0..closers.length() {
            let Some(closer) = closers.item(i) else {
                continue;
            };
            let event = UiEvent::click_class(anchors.close_class.clone());
            listen(&closer, "click", route(&ui, move |_: &Event| Some(event.clone())))?;
        }
    }
    info!(surface = ?ui.borrow().surface_kind(), "Search mounted");

    Ok(SearchHandle { ui })
}

/// Page attribute name for a script attribute or `dataset` key.
pub fn attribute_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

fn attributes_from_js(value: JsValue) -> Result<PageAttributes> {
    if value.is_undefined() || value.is_null() {
        return Ok(PageAttributes::new());
    }
    let raw: std::collections::BTreeMap<String, String> =
        serde_wasm_bindgen::from_value(value).map_err(|e| MountError::input("attributes", e))?;
    Ok(raw.into_iter().map(|(k, v)| (attribute_name(&k), v)).collect())
}

fn options_from_js(value: JsValue) -> Result<UiOptions> {
    if value.is_undefined() || value.is_null() {
        return Ok(UiOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| MountError::input("options", e))
}

fn listen(target: &EventTarget, kind: &str, mut handler: impl FnMut(&Event) + 'static) -> Result<()> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| handler(&event));
    target
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .map_err(|e| MountError::Dom(describe(&e)))?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

fn route(
    ui: &SharedUi,
    convert: impl Fn(&Event) -> Option<UiEvent> + 'static,
) -> impl FnMut(&Event) + 'static {
    let ui = Rc::clone(ui);
    move |event: &Event| {
        let Some(ui_event) = convert(event) else {
            return;
        };
        if ui.borrow_mut().handle(&ui_event) == Disposition::PreventDefault {
            event.prevent_default();
        }
    }
}

fn input_event(event: &Event) -> Option<UiEvent> {
    let input = event.target()?.dyn_into::<HtmlInputElement>().ok()?;
    Some(UiEvent::input(input.id(), input.value()))
}

/// Click with the exact target; used for the modal backdrop.
fn click_event(event: &Event) -> Option<UiEvent> {
    let element = event.target()?.dyn_into::<Element>().ok()?;
    let id = element.id();
    Some(UiEvent::Click {
        target: (!id.is_empty()).then_some(id),
        classes: element.class_name().split_whitespace().map(str::to_string).collect(),
    })
}

fn key_event(event: &Event) -> Option<UiEvent> {
    let key = event.dyn_ref::<KeyboardEvent>()?;
    Some(UiEvent::KeyDown(KeyEvent {
        code: key.code(),
        default_prevented: key.default_prevented(),
    }))
}
