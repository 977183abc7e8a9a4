//! Messages exchanged between the page and the search worker.
//!
//! Both directions are serde values so the same shapes travel over
//! `postMessage` in the browser and over in-process channels natively.

use protosearch_core::{Hit, config::PARAM_INDEX};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::LoadError;

/// Worker script, resolved relative to the search script.
pub const WORKER_SCRIPT: &str = "worker.js";

/// Index base name used when the worker URL carries no `index` parameter.
pub const DEFAULT_INDEX: &str = "searchIndex";

/// File extension of index resources.
pub const INDEX_EXTENSION: &str = "idx";

/// Placeholder query run right after loading to warm the engine up.
pub const WARMUP_QUERY: &str = "warmup";

/// Page-to-worker request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Sequence number, strictly increasing per channel.
    pub seq: u64,

    /// Raw query text; empty clears the results.
    pub query: String,
}

/// Page-to-worker envelope used when the worker runs out of process.
///
/// In-process workers receive [`WorkerInit`] directly and only [`Request`]s
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerCommand {
    /// First command after the worker reports [`WorkerMessage::Started`];
    /// the worker starts loading the index on receipt.
    Start { warmup: bool },

    /// A search request.
    Search(Request),
}

/// Worker-to-page message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage {
    /// An out-of-process worker is listening for commands. Sent once, before
    /// anything else.
    Started,

    /// The index is loaded and queries will be answered.
    Ready,

    /// Hits for the request tagged `seq`, in engine rank order.
    Results { seq: u64, hits: Vec<Hit> },

    /// The index failed to load; no request will be answered.
    Unavailable { reason: String },
}

/// Options passed to a worker at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerInit {
    /// Worker resource URL, carrying the forwarded parameters.
    pub url: Url,

    /// Whether to run [`WARMUP_QUERY`] once the index is loaded.
    pub warmup: bool,
}

/// Build the worker resource URL next to the search script.
///
/// The parameter string is appended only when non-empty so the default URL
/// stays clean.
pub fn worker_url(script_url: &Url, worker_params: &str) -> Result<Url, url::ParseError> {
    if worker_params.is_empty() {
        script_url.join(WORKER_SCRIPT)
    } else {
        script_url.join(&format!("{WORKER_SCRIPT}?{worker_params}"))
    }
}

/// Index base name requested by a worker URL.
pub fn index_name(worker_url: &Url) -> String {
    worker_url
        .query_pairs()
        .find(|(k, _)| k == PARAM_INDEX)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_INDEX.to_string())
}

/// Location of the index resource, relative to the worker.
///
/// Only plain base names are accepted; anything that could escape the worker
/// directory or alter the URL is rejected.
pub fn index_location(worker_url: &Url) -> Result<Url, LoadError> {
    let name = index_name(worker_url);

    let plain = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !plain || name.starts_with('.') || name.contains("..") {
        return Err(LoadError::InvalidIndexName(name));
    }

    worker_url
        .join(&format!("{name}.{INDEX_EXTENSION}"))
        .map_err(|e| LoadError::fetch(name, e.to_string()))
}
