//! Protosearch UI
//!
//! Wires a page's search input and results container to the query channel
//! and renders hits through the configured renderer.
//!
//! # Surfaces
//!
//! - **Modal**: needs `search-modal`, `search-modal-input`,
//!   `search-modal-content-body` and `search-top-bar` (close control: class
//!   `search-close`). Opened with `/`, closed with `Escape`.
//! - **Inline**: needs `search-results` and `search-input`.
//!
//! The ids are defaults from [`Anchors`] and can be changed per skin.
//!
//! # Example
//!
//! ```ignore
//! let registry = RendererRegistry::with_builtin_renderers();
//! let mut ui = SearchUi::setup(page, Arc::new(config), &registry, &spawner, UiOptions::default())?;
//!
//! ui.handle(&UiEvent::input("search-input", "rust"));
//! ui.pump();
//! ```

pub mod controller;
pub mod error;
pub mod options;
pub mod page;

pub use controller::{Disposition, KeyEvent, SearchUi, SurfaceKind, UiEvent, Update};
pub use error::{Result, SetupError};
pub use options::{Anchors, UiOptions};
pub use page::{MemoryPage, Page};
