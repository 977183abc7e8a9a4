//! Resolve command - show the effective configuration for a page

use color_eyre::eyre::{Result, WrapErr};
use protosearch_channel::protocol;
use protosearch_core::Config;
use serde_json::{Value, json};

use super::{attributes, parse_url};

/// Resolve the configuration a page would get and the worker URL it would
/// start, as JSON.
pub fn resolve(script_url: &str, page_url: &str, attrs: &[(String, String)]) -> Result<Value> {
    let script_url = parse_url("script", script_url)?;
    let page_url = parse_url("page", page_url)?;

    let config = Config::resolve_for_page(&attributes(attrs), &page_url, &script_url)
        .wrap_err("Failed to resolve configuration")?;
    let worker_url = protocol::worker_url(config.script_url(), config.worker_params())
        .wrap_err("Failed to build worker URL")?;
    let index_location = protocol::index_location(&worker_url)
        .map(|url| url.to_string())
        .map_err(|e| e.to_string());

    Ok(json!({
        "config": config,
        "worker_url": worker_url.as_str(),
        "index": match index_location {
            Ok(url) => json!({ "location": url }),
            Err(reason) => json!({ "error": reason }),
        },
    }))
}

/// Run the resolve command.
pub fn run(script_url: &str, page_url: &str, attrs: &[(String, String)]) -> Result<()> {
    tracing::info!(script_url, page_url, "Resolving configuration");

    let resolved = resolve(script_url, page_url, attrs)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);

    Ok(())
}
