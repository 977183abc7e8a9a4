//! Protosearch Web
//!
//! Browser bindings: mounts the search UI on the page and serves the search
//! engine from a dedicated Web Worker.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! // search.js, loaded with <script src=".../search.js" data-show-score="true">
//! import init, { mount } from './protosearch_web.js';
//!
//! await init();
//! const script = document.currentScript ?? document.querySelector('script[src$="search.js"]');
//! mount(script.src, script.dataset);
//! ```
//!
//! ```javascript
//! // worker.js
//! import init, { serveWorker } from './protosearch_web.js';
//! import { QuerierBuilder } from './engine.js';
//!
//! await init();
//! serveWorker(QuerierBuilder);
//! ```

pub mod error;
pub mod mount;
pub mod page;
pub mod spawner;
pub mod worker;

pub use error::{MountError, Result};
pub use mount::{SearchHandle, mount, mount_with};
pub use page::WebPage;
pub use spawner::WebWorkerSpawner;
pub use worker::{JsQuerier, JsQuerierLoader, serve_worker};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
///
/// Sets up the panic hook and routes logs to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
