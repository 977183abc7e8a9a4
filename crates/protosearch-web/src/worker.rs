//! Worker side: loads the index and answers queries inside a Web Worker.
//!
//! The engine itself stays in JavaScript. It is reached through a builder
//! object exposing `load(blob)` (which may return a promise) and the querier it
//! yields, exposing `search(query)`.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use gloo_net::http::Request as HttpRequest;
use js_sys::{Array, Function, Promise, Reflect, Uint8Array};
use protosearch_channel::{
    LoadError, Querier, QueryError, WorkerCommand, WorkerCore, WorkerMessage, protocol,
};
use protosearch_core::Hit;
use tracing::{debug, info, warn};
use url::Url;
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Blob, DedicatedWorkerGlobalScope, MessageEvent};

use crate::spawner::{describe, to_js};

/// A loaded JavaScript querier.
#[derive(Debug, Clone)]
pub struct JsQuerier {
    inner: JsValue,
}

impl JsQuerier {
    pub fn new(inner: JsValue) -> Self {
        Self { inner }
    }
}

impl Querier for JsQuerier {
    fn search(&self, query: &str) -> Result<Vec<Hit>, QueryError> {
        let search = method(&self.inner, "search").map_err(QueryError)?;
        let hits = search
            .call1(&self.inner, &JsValue::from_str(query))
            .map_err(|e| QueryError(describe(&e)))?;
        serde_wasm_bindgen::from_value(hits).map_err(|e| QueryError(e.to_string()))
    }
}

/// Builds [`JsQuerier`]s from index bytes.
#[derive(Debug, Clone)]
pub struct JsQuerierLoader {
    builder: JsValue,
}

impl JsQuerierLoader {
    pub fn new(builder: JsValue) -> Self {
        Self { builder }
    }

    /// Hand the index to the builder and await the querier.
    pub async fn load(&self, index: &[u8]) -> Result<JsQuerier, LoadError> {
        let load = method(&self.builder, "load").map_err(LoadError::decode)?;

        let parts = Array::of1(&Uint8Array::from(index));
        let blob = Blob::new_with_u8_array_sequence(&parts).map_err(|e| LoadError::decode(describe(&e)))?;

        let returned = load
            .call1(&self.builder, &blob)
            .map_err(|e| LoadError::decode(describe(&e)))?;
        let querier = match returned.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .map_err(|e| LoadError::decode(describe(&e)))?,
            Err(value) => value,
        };

        Ok(JsQuerier::new(querier))
    }
}

/// Serve search requests from inside a dedicated worker.
///
/// Installs the message handler, then tells the page it is listening with
/// [`WorkerMessage::Started`]. The index is fetched once the page's `start`
/// command arrives; searches received before it has loaded are answered when
/// loading finishes.
#[wasm_bindgen(js_name = serveWorker)]
pub fn serve_worker(builder: JsValue) -> Result<(), JsValue> {
    let scope: DedicatedWorkerGlobalScope = js_sys::global().dyn_into()?;
    let url = Url::parse(&scope.location().href()).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let core = Rc::new(RefCell::new(WorkerCore::<JsQuerier>::new()));
    let loading = Rc::new(Cell::new(false));
    let loader = JsQuerierLoader::new(builder);

    let onmessage = {
        let scope = scope.clone();
        Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            match serde_wasm_bindgen::from_value::<WorkerCommand>(event.data()) {
                Ok(WorkerCommand::Start { warmup }) => {
                    if loading.replace(true) {
                        debug!("Ignoring repeated start");
                        return;
                    }
                    spawn_local(load(
                        scope.clone(),
                        url.clone(),
                        loader.clone(),
                        Rc::clone(&core),
                        warmup,
                    ));
                }
                Ok(WorkerCommand::Search(request)) => {
                    let reply = core.borrow_mut().on_request(request);
                    if let Some(message) = reply {
                        post(&scope, &message);
                    }
                }
                Err(e) => warn!(error = %e, "Ignoring malformed page message"),
            }
        })
    };
    scope.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    post(&scope, &WorkerMessage::Started);
    Ok(())
}

async fn load(
    scope: DedicatedWorkerGlobalScope,
    url: Url,
    loader: JsQuerierLoader,
    core: Rc<RefCell<WorkerCore<JsQuerier>>>,
    warmup: bool,
) {
    let loaded = load_index(&url, &loader).await;
    if let Err(e) = &loaded {
        warn!(error = %e, "Index unavailable");
    }

    let messages = core.borrow_mut().on_loaded(loaded, warmup);
    for message in &messages {
        post(&scope, message);
    }
}

/// Fetch the index next to the worker script and hand it to `loader`.
///
/// The index name comes from the `index` parameter of `worker_url`.
pub async fn load_index(worker_url: &Url, loader: &JsQuerierLoader) -> Result<JsQuerier, LoadError> {
    let location = protocol::index_location(worker_url)?;
    debug!(%location, "Fetching index");

    let response = HttpRequest::get(location.as_str())
        .send()
        .await
        .map_err(|e| LoadError::fetch(location.as_str(), e.to_string()))?;
    if !response.ok() {
        return Err(LoadError::fetch(
            location.as_str(),
            format!("HTTP {}", response.status()),
        ));
    }

    let bytes = response
        .binary()
        .await
        .map_err(|e| LoadError::fetch(location.as_str(), e.to_string()))?;
    let querier = loader.load(&bytes).await?;
    info!(%location, bytes = bytes.len(), "Index loaded");

    Ok(querier)
}

fn post(scope: &DedicatedWorkerGlobalScope, message: &WorkerMessage) {
    let sent = to_js(message).and_then(|value| scope.post_message(&value));
    if let Err(e) = sent {
        warn!(error = %describe(&e), "Failed to post worker message");
    }
}

fn method(target: &JsValue, name: &str) -> Result<Function, String> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or_else(|| format!("Engine object has no `{name}` method"))
}
