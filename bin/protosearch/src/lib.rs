//! Protosearch CLI Library
//!
//! Developer tooling for sites and skins using Protosearch: inspect how a
//! page's configuration resolves and preview renderer output without a
//! browser.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (resolve, render)
//!
//! # Example
//!
//! ```no_run
//! use protosearch::cmd;
//!
//! let json = cmd::resolve::resolve(
//!     "https://example.com/search/search.js",
//!     "https://example.com/docs/?q=rust&index=api",
//!     &[],
//! )
//! .unwrap();
//! println!("{json}");
//! ```

pub mod cmd;

pub use protosearch_core::{Config, Hit, PageAttributes, RendererRegistry};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
