//! Search surface controller.
//!
//! Binds one of two surfaces to a [`QueryChannel`]:
//!
//! - **Modal**: an overlay opened by a trigger element or `/`, closed by a
//!   close control, a click on the backdrop or `Escape`.
//! - **Inline**: a results list that is always visible.
//!
//! The modal wins when all of its anchors exist. Every input event is sent to
//! the channel immediately; result batches replace the results container.

use std::sync::Arc;

use protosearch_channel::{
    ChannelEvent, EngineStatus, QueryChannel, ResultBatch, WorkerSpawner,
};
use protosearch_core::{Config, RendererRegistry, SharedRenderer};
use tracing::{debug, error, info, warn};

use crate::{
    error::{Result, SetupError},
    options::UiOptions,
    page::Page,
};

/// `KeyboardEvent.code` opening the modal.
pub const KEY_OPEN: &str = "Slash";
/// `KeyboardEvent.code` closing the modal.
pub const KEY_CLOSE: &str = "Escape";

/// Diagnostic shown when no renderer is available.
pub const NO_RENDERER_MESSAGE: &str =
    "Protosearch: No renderer registered. Register one (e.g. docs) before mounting search.";

/// Which surface the controller bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Modal,
    Inline,
}

/// Keyboard event as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Physical key code, e.g. `Slash`.
    pub code: String,
    /// Whether another handler already consumed the event.
    pub default_prevented: bool,
}

impl KeyEvent {
    /// An unconsumed key press.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            default_prevented: false,
        }
    }
}

/// Page event routed to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The value of an input changed.
    Input { target: String, value: String },
    /// A click; `target` is the id of the clicked element, if any.
    Click { target: Option<String>, classes: Vec<String> },
    /// A key press on the window.
    KeyDown(KeyEvent),
}

impl UiEvent {
    /// Input event on the element `target`.
    pub fn input(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Input {
            target: target.into(),
            value: value.into(),
        }
    }

    /// Click on the element with id `target`.
    pub fn click(target: impl Into<String>) -> Self {
        Self::Click {
            target: Some(target.into()),
            classes: Vec::new(),
        }
    }

    /// Click on an element without id carrying `class`.
    pub fn click_class(class: impl Into<String>) -> Self {
        Self::Click {
            target: None,
            classes: vec![class.into()],
        }
    }

    /// Unconsumed key press.
    pub fn key(code: impl Into<String>) -> Self {
        Self::KeyDown(KeyEvent::new(code))
    }
}

/// What the caller should do with the DOM event after handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Not for the search UI.
    Ignored,
    /// Handled; let the default action happen.
    Handled,
    /// Handled; call `preventDefault`.
    PreventDefault,
}

/// Page change caused by a channel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// The engine finished loading.
    Ready,
    /// The unavailable state was rendered.
    Unavailable,
    /// Results were rendered.
    Rendered { seq: u64, hits: usize },
}

enum Surface {
    Modal { open: bool },
    Inline,
}

/// Search UI bound to one page.
pub struct SearchUi<P: Page> {
    page: P,
    config: Arc<Config>,
    renderer: SharedRenderer,
    channel: QueryChannel,
    surface: Surface,
    options: UiOptions,
}

impl<P: Page> SearchUi<P> {
    /// Wire the search UI to `page`.
    ///
    /// Fails without touching the page further if no renderer resolves (the
    /// failure is reported on the page), or if no surface exists.
    pub fn setup(
        mut page: P,
        config: Arc<Config>,
        registry: &RendererRegistry,
        spawner: &dyn WorkerSpawner,
        options: UiOptions,
    ) -> Result<Self> {
        let Some(renderer) = registry.get(config.renderer()) else {
            error!("No renderer registered");
            page.report_error(NO_RENDERER_MESSAGE);
            return Err(SetupError::NoRenderer);
        };

        let anchors = &options.anchors;
        let surface = if [&anchors.modal, &anchors.modal_input, &anchors.modal_body, &anchors.modal_trigger]
            .iter()
            .all(|id| page.has_element(id))
        {
            Surface::Modal { open: false }
        } else if page.has_element(&anchors.results) && page.has_element(&anchors.search_input) {
            Surface::Inline
        } else {
            warn!("No search surface anchors found");
            return Err(SetupError::NoSurface);
        };

        let initial_query = match surface {
            Surface::Inline => config.query(),
            Surface::Modal { .. } if config.modal_autorun() => config.query(),
            Surface::Modal { .. } => None,
        }
        .map(str::to_string);

        let channel = match QueryChannel::open(&config, spawner, initial_query.is_none()) {
            Ok(channel) => channel,
            Err(e) => {
                page.report_error(&format!("Protosearch: {e}"));
                return Err(e.into());
            }
        };

        let mut ui = Self {
            page,
            config,
            renderer,
            channel,
            surface,
            options,
        };
        info!(surface = ?ui.surface_kind(), "Search UI ready");

        if let Some(query) = initial_query {
            let input = ui.input_id().to_string();
            ui.page.set_value(&input, &query);
            ui.search(&query);
        }

        Ok(ui)
    }

    /// Bound surface.
    pub fn surface_kind(&self) -> SurfaceKind {
        match self.surface {
            Surface::Modal { .. } => SurfaceKind::Modal,
            Surface::Inline => SurfaceKind::Inline,
        }
    }

    /// Whether the modal is open. Always false for the inline surface.
    pub fn is_open(&self) -> bool {
        matches!(self.surface, Surface::Modal { open: true })
    }

    /// Engine status.
    pub fn status(&self) -> &EngineStatus {
        self.channel.status()
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The page.
    pub fn page(&self) -> &P {
        &self.page
    }

    /// Id of the active search input.
    pub fn input_id(&self) -> &str {
        match self.surface {
            Surface::Modal { .. } => &self.options.anchors.modal_input,
            Surface::Inline => &self.options.anchors.search_input,
        }
    }

    /// Id of the active results container.
    pub fn results_id(&self) -> &str {
        match self.surface {
            Surface::Modal { .. } => &self.options.anchors.modal_body,
            Surface::Inline => &self.options.anchors.results,
        }
    }

    /// Handle a page event.
    pub fn handle(&mut self, event: &UiEvent) -> Disposition {
        match event {
            UiEvent::Input { target, value } if target == self.input_id() => {
                self.search(value);
                Disposition::Handled
            }
            UiEvent::Input { .. } => Disposition::Ignored,
            UiEvent::Click { target, classes } => self.on_click(target.as_deref(), classes),
            UiEvent::KeyDown(key) => self.on_key(key),
        }
    }

    /// Open the modal and focus its input. No-op on the inline surface.
    pub fn open(&mut self) {
        let Surface::Modal { open } = &mut self.surface else {
            return;
        };
        let was_open = *open;
        *open = true;

        let anchors = &self.options.anchors;
        self.page.set_visible(&anchors.modal, true);
        if !was_open && self.options.reset_on_open {
            self.channel.invalidate();
            self.page.set_value(&anchors.modal_input, "");
            self.page.set_inner_html(&anchors.modal_body, &self.options.placeholder_markup);
        }
        self.page.focus(&anchors.modal_input);
    }

    /// Close the modal. No-op on the inline surface.
    pub fn close(&mut self) {
        if let Surface::Modal { open } = &mut self.surface {
            *open = false;
            self.page.set_visible(&self.options.anchors.modal, false);
        }
    }

    /// Apply every channel event received so far. Returns the updates made.
    pub fn pump(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Some(event) = self.channel.try_next() {
            updates.push(self.apply(event));
        }
        updates
    }

    /// Wait for the next channel event and apply it.
    ///
    /// Returns `None` once the worker is gone. Must not be called from within
    /// an async runtime.
    pub fn pump_blocking(&mut self) -> Option<Update> {
        let event = self.channel.blocking_next()?;
        Some(self.apply(event))
    }

    /// Async variant of [`SearchUi::pump_blocking`].
    pub async fn next_update(&mut self) -> Option<Update> {
        let event = self.channel.next().await?;
        Some(self.apply(event))
    }

    /// Terminate the worker.
    pub fn dispose(&mut self) {
        self.channel.dispose();
    }

    fn search(&mut self, query: &str) {
        if let Err(e) = self.channel.send(query) {
            warn!(error = %e, "Dropping search input");
            return;
        }

        let status_markup = match self.channel.status() {
            EngineStatus::Loading => Some(self.options.loading_markup.clone()),
            EngineStatus::Unavailable(_) => Some(self.options.unavailable_markup.clone()),
            EngineStatus::Ready => None,
        };
        if let Some(markup) = status_markup {
            let results = self.results_id().to_string();
            self.page.set_inner_html(&results, &markup);
        }
    }

    fn on_click(&mut self, target: Option<&str>, classes: &[String]) -> Disposition {
        if !matches!(self.surface, Surface::Modal { .. }) {
            return Disposition::Ignored;
        }

        let anchors = &self.options.anchors;
        if target == Some(anchors.modal_trigger.as_str()) {
            self.open();
            Disposition::Handled
        } else if classes.iter().any(|c| *c == anchors.close_class) || target == Some(anchors.modal.as_str()) {
            self.close();
            Disposition::Handled
        } else {
            Disposition::Ignored
        }
    }

    fn on_key(&mut self, key: &KeyEvent) -> Disposition {
        let Surface::Modal { open } = self.surface else {
            return Disposition::Ignored;
        };
        if key.default_prevented {
            return Disposition::Ignored;
        }

        match key.code.as_str() {
            KEY_OPEN if !open => {
                self.open();
                Disposition::PreventDefault
            }
            KEY_CLOSE if open => {
                self.close();
                Disposition::PreventDefault
            }
            _ => Disposition::Ignored,
        }
    }

    fn apply(&mut self, event: ChannelEvent) -> Update {
        match event {
            ChannelEvent::Ready => Update::Ready,
            ChannelEvent::Unavailable(reason) => {
                debug!(%reason, "Rendering unavailable state");
                let results = self.results_id().to_string();
                self.page.set_inner_html(&results, &self.options.unavailable_markup);
                Update::Unavailable
            }
            ChannelEvent::Results(batch) => self.render(batch),
        }
    }

    fn render(&mut self, batch: ResultBatch) -> Update {
        let markup = if batch.hits.is_empty() {
            self.options.no_results_markup.clone()
        } else {
            batch
                .hits
                .iter()
                .map(|hit| self.renderer.render(hit, &self.config))
                .collect::<String>()
        };

        let results = self.results_id().to_string();
        self.page.set_inner_html(&results, &markup);
        debug!(seq = batch.seq, hits = batch.hits.len(), "Rendered results");

        Update::Rendered {
            seq: batch.seq,
            hits: batch.hits.len(),
        }
    }
}

impl<P: Page> std::fmt::Debug for SearchUi<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchUi")
            .field("surface", &self.surface_kind())
            .field("open", &self.is_open())
            .field("channel", &self.channel)
            .finish()
    }
}
