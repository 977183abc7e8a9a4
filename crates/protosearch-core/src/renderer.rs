//! Renderer trait and registry.
//!
//! Skins plug their result markup into the coordinator by registering a
//! [`Renderer`] under a name. The coordinator only ever asks the registry.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    config::Config,
    error::{CoreError, Result},
    hit::Hit,
    renderers,
};

/// Formats one hit as markup.
///
/// Implementations must be pure: no side effects and no state carried between
/// calls. Plain functions and closures with the right signature implement this
/// trait.
pub trait Renderer: Send + Sync {
    /// Render a single hit.
    fn render(&self, hit: &Hit, config: &Config) -> String;
}

impl<F> Renderer for F
where
    F: Fn(&Hit, &Config) -> String + Send + Sync,
{
    fn render(&self, hit: &Hit, config: &Config) -> String {
        self(hit, config)
    }
}

/// Shared handle to a registered renderer.
pub type SharedRenderer = Arc<dyn Renderer>;

/// Named renderers with a default slot.
///
/// The first registered renderer becomes the default unless
/// [`RendererRegistry::set_default`] pins one explicitly. There is no removal.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, SharedRenderer>,
    order: Vec<String>,
    default: Option<SharedRenderer>,
    default_pinned: bool,
}

impl RendererRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in `docs` and `cards` renderers,
    /// with `docs` as the default.
    pub fn with_builtin_renderers() -> Self {
        let mut registry = Self::new();
        registry.register(renderers::DOCS, renderers::render_docs);
        registry.register(renderers::CARDS, renderers::render_cards);
        registry
    }

    /// Register a renderer, replacing any renderer with the same name.
    ///
    /// The default slot is filled by the first registration only.
    pub fn register(&mut self, name: impl Into<String>, renderer: impl Renderer + 'static) {
        let name = name.into();
        let renderer: SharedRenderer = Arc::new(renderer);

        if self.default.is_none() {
            self.default = Some(Arc::clone(&renderer));
        }
        if self.renderers.insert(name.clone(), renderer).is_none() {
            self.order.push(name.clone());
        }

        tracing::debug!(renderer = %name, "Registered renderer");
    }

    /// Pin the default to a registered renderer.
    ///
    /// Later registrations never replace a pinned default.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        let renderer = self
            .renderers
            .get(name)
            .ok_or_else(|| CoreError::unknown_renderer(name))?;

        self.default = Some(Arc::clone(renderer));
        self.default_pinned = true;
        Ok(())
    }

    /// Whether the default was pinned with [`RendererRegistry::set_default`].
    pub fn has_pinned_default(&self) -> bool {
        self.default_pinned
    }

    /// Look up a renderer by name, falling back to the default.
    ///
    /// Returns `None` only when nothing matches and no default exists.
    pub fn get(&self, name: Option<&str>) -> Option<SharedRenderer> {
        if let Some(name) = name {
            match self.renderers.get(name) {
                Some(renderer) => return Some(Arc::clone(renderer)),
                None => tracing::warn!(renderer = name, "Renderer not registered, using default"),
            }
        }
        self.default.clone()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Whether no renderer has been registered.
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("renderers", &self.order)
            .field("has_default", &self.default.is_some())
            .field("default_pinned", &self.default_pinned)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::config::PageAttributes;

    fn config() -> Config {
        let script = Url::parse("https://example.com/search/search.js").unwrap();
        Config::resolve(&PageAttributes::new(), "", &script).unwrap()
    }

    fn render_f(_: &Hit, _: &Config) -> String {
        "f".to_string()
    }

    fn render_g(_: &Hit, _: &Config) -> String {
        "g".to_string()
    }

    fn output(renderer: Option<SharedRenderer>) -> String {
        renderer.expect("renderer").render(&Hit::new(1.0), &config())
    }

    #[test]
    fn test_first_registration_is_default() {
        let mut registry = RendererRegistry::new();
        registry.register("docs", render_f);
        registry.register("other", render_g);

        assert_eq!(output(registry.get(None)), "f");
        assert_eq!(output(registry.get(Some("other"))), "g");
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = RendererRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(None).is_none());
        assert!(registry.get(Some("docs")).is_none());
    }

    #[test]
    fn test_unknown_name_falls_back_to_default() {
        let mut registry = RendererRegistry::new();
        registry.register("docs", render_f);

        assert_eq!(output(registry.get(Some("scaladoc"))), "f");
    }

    #[test]
    fn test_overwrite_keeps_original_default() {
        let mut registry = RendererRegistry::new();
        registry.register("docs", render_f);
        registry.register("docs", render_g);

        assert_eq!(output(registry.get(Some("docs"))), "g");
        assert_eq!(output(registry.get(None)), "f");
        assert_eq!(registry.names(), ["docs".to_string()]);
    }

    #[test]
    fn test_set_default_pins_renderer() {
        let mut registry = RendererRegistry::new();
        registry.register("docs", render_f);
        registry.register("other", render_g);
        registry.set_default("other").unwrap();

        assert!(registry.has_pinned_default());
        assert_eq!(output(registry.get(None)), "g");
    }

    #[test]
    fn test_set_default_unknown_name() {
        let mut registry = RendererRegistry::new();
        let result = registry.set_default("missing");
        assert!(matches!(result, Err(CoreError::UnknownRenderer(name)) if name == "missing"));
    }

    #[test]
    fn test_closure_renderer() {
        let prefix = String::from("hit:");
        let mut registry = RendererRegistry::new();
        registry.register("closure", move |hit: &Hit, _: &Config| format!("{prefix}{}", hit.score));

        assert_eq!(output(registry.get(None)), "hit:1");
    }

    #[test]
    fn test_builtin_renderers() {
        let registry = RendererRegistry::with_builtin_renderers();
        assert_eq!(registry.names(), ["docs".to_string(), "cards".to_string()]);

        let hit = Hit::new(1.0).with_field("path", "/a").with_field("title", "A");
        let markup = registry.get(None).unwrap().render(&hit, &config());
        assert!(markup.contains("ps-result"));
    }
}
