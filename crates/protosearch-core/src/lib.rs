//! Protosearch Core Library
//!
//! Configuration resolution, the search hit model and the renderer registry
//! shared by the query channel and the UI surface controller.
//!
//! # Example
//!
//! ```
//! use protosearch_core::{Config, Hit, PageAttributes, RendererRegistry};
//! use url::Url;
//!
//! let script = Url::parse("https://example.com/docs/search/search.js").unwrap();
//! let attrs = PageAttributes::new().with("show-score", "true");
//! let config = Config::resolve(&attrs, "?q=rust", &script).unwrap();
//!
//! let registry = RendererRegistry::with_builtin_renderers();
//! let renderer = registry.get(config.renderer()).unwrap();
//! let hit = Hit::new(1.0).with_field("path", "/intro").with_field("title", "Intro");
//! assert!(renderer.render(&hit, &config).contains("intro.html"));
//! ```

pub mod config;
pub mod error;
pub mod hit;
pub mod renderer;
pub mod renderers;

pub use config::{Config, PageAttributes};
pub use error::{CoreError, Result};
pub use hit::Hit;
pub use renderer::{Renderer, RendererRegistry, SharedRenderer};
