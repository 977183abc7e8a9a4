//! Render command - preview renderer output for a list of hits

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use protosearch_core::{Config, Hit, RendererRegistry, config::ATTR_RENDERER};

use super::{attributes, parse_url};

/// Script location used when none is given; links resolve against its parent.
pub const DEFAULT_SCRIPT_URL: &str = "http://localhost/search/search.js";

/// Render the hits stored in `hits_path` (a JSON array) with the built-in
/// renderers.
///
/// An explicit renderer name must be registered; without one the page
/// attributes decide, falling back to the default renderer.
pub fn render(
    hits_path: &Path,
    renderer: Option<&str>,
    script_url: &str,
    attrs: &[(String, String)],
) -> Result<String> {
    let content = std::fs::read_to_string(hits_path)
        .wrap_err_with(|| format!("Failed to read {}", hits_path.display()))?;
    let hits: Vec<Hit> = serde_json::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse hits from {}", hits_path.display()))?;

    let registry = RendererRegistry::with_builtin_renderers();
    let mut attributes = attributes(attrs);
    if let Some(name) = renderer {
        if !registry.names().iter().any(|n| n == name) {
            bail!(
                "Unknown renderer `{name}` (available: {})",
                registry.names().join(", ")
            );
        }
        attributes.insert(ATTR_RENDERER, name);
    }

    let config = Config::resolve(&attributes, "", &parse_url("script", script_url)?)
        .wrap_err("Failed to resolve configuration")?;
    let Some(renderer) = registry.get(config.renderer()) else {
        bail!("No renderer registered");
    };

    tracing::debug!(hits = hits.len(), renderer = ?config.renderer(), "Rendering hits");
    Ok(hits.iter().map(|hit| renderer.render(hit, &config)).collect())
}

/// Run the render command.
pub fn run(
    hits_path: &Path,
    renderer: Option<&str>,
    script_url: &str,
    attrs: &[(String, String)],
) -> Result<()> {
    tracing::info!(?hits_path, "Rendering hits");

    let markup = render(hits_path, renderer, script_url, attrs)?;
    println!("{markup}");

    Ok(())
}
