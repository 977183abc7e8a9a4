//! The search worker.
//!
//! [`WorkerCore`] holds the worker's behavior without any I/O: it owns the
//! decoded engine, queues requests that arrive while the index is loading and
//! turns each request into exactly one response, in arrival order. Runners
//! feed it; [`ThreadSpawner`] runs it on a dedicated OS thread, and the browser
//! bindings run it inside a Web Worker.

use std::{collections::VecDeque, sync::Arc, thread::JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    engine::{IndexSource, Querier, QuerierLoader},
    error::{ChannelError, LoadError, Result},
    protocol::{Request, WARMUP_QUERY, WorkerInit, WorkerMessage, index_location, index_name},
};

/// Sender half used by workers to emit messages to the page.
pub type EventSink = mpsc::UnboundedSender<WorkerMessage>;

/// Page-side handle to a running worker.
pub trait WorkerHandle {
    /// Post a request to the worker.
    fn post(&mut self, request: Request) -> Result<()>;

    /// Stop the worker. Idempotent.
    fn terminate(&mut self);
}

/// Starts workers for query channels.
pub trait WorkerSpawner {
    /// Start one worker that reports to `events`.
    fn spawn(&self, init: WorkerInit, events: EventSink) -> Result<Box<dyn WorkerHandle>>;
}

enum CoreState<Q> {
    Loading,
    Ready(Q),
    Failed,
}

/// I/O-free worker state machine.
pub struct WorkerCore<Q> {
    state: CoreState<Q>,
    pending: VecDeque<Request>,
}

impl<Q: Querier> Default for WorkerCore<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: Querier> WorkerCore<Q> {
    /// Create a worker waiting for its index.
    pub fn new() -> Self {
        Self {
            state: CoreState::Loading,
            pending: VecDeque::new(),
        }
    }

    /// Whether the engine is loaded.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, CoreState::Ready(_))
    }

    /// Number of requests waiting for the index.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Record the outcome of the index load.
    ///
    /// On success, runs the warm-up query if asked to, then answers every
    /// queued request in order. On failure, reports the reason once and drops
    /// the queue; the worker never retries.
    pub fn on_loaded(&mut self, loaded: std::result::Result<Q, LoadError>, warmup: bool) -> Vec<WorkerMessage> {
        if !matches!(self.state, CoreState::Loading) {
            warn!("Index load reported twice, ignoring");
            return Vec::new();
        }

        match loaded {
            Ok(querier) => {
                if warmup {
                    match querier.search(WARMUP_QUERY) {
                        Ok(hits) => debug!(hits = hits.len(), "Warm-up query done"),
                        Err(e) => warn!(error = %e, "Warm-up query failed"),
                    }
                }

                let mut messages = vec![WorkerMessage::Ready];
                messages.extend(self.pending.drain(..).map(|request| answer(&querier, request)));
                self.state = CoreState::Ready(querier);
                messages
            }
            Err(e) => {
                error!(error = %e, "Failed to load search index");
                if !self.pending.is_empty() {
                    debug!(dropped = self.pending.len(), "Dropping queued requests");
                }
                self.pending.clear();
                self.state = CoreState::Failed;
                vec![WorkerMessage::Unavailable {
                    reason: e.to_string(),
                }]
            }
        }
    }

    /// Handle one request. Returns the response when it can be answered now.
    pub fn on_request(&mut self, request: Request) -> Option<WorkerMessage> {
        match &self.state {
            CoreState::Loading => {
                debug!(seq = request.seq, "Index not loaded yet, queueing request");
                self.pending.push_back(request);
                None
            }
            CoreState::Ready(querier) => Some(answer(querier, request)),
            CoreState::Failed => {
                debug!(seq = request.seq, "Index unavailable, dropping request");
                None
            }
        }
    }
}

/// Answer one request. Empty queries clear the results without touching the
/// engine; engine failures answer with no hits so the worker keeps serving.
fn answer<Q: Querier>(querier: &Q, request: Request) -> WorkerMessage {
    let hits = if request.query.is_empty() {
        Vec::new()
    } else {
        querier.search(&request.query).unwrap_or_else(|e| {
            warn!(seq = request.seq, error = %e, "Query failed");
            Vec::new()
        })
    };

    WorkerMessage::Results {
        seq: request.seq,
        hits,
    }
}

/// Runs each worker on its own OS thread.
#[derive(Debug)]
pub struct ThreadSpawner<S, L> {
    source: Arc<S>,
    loader: Arc<L>,
}

impl<S, L> Clone for ThreadSpawner<S, L> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<S, L> ThreadSpawner<S, L>
where
    S: IndexSource + Send + Sync + 'static,
    L: QuerierLoader + Send + Sync + 'static,
{
    /// Create a spawner fetching from `source` and decoding with `loader`.
    pub fn new(source: S, loader: L) -> Self {
        Self {
            source: Arc::new(source),
            loader: Arc::new(loader),
        }
    }
}

impl<S, L> WorkerSpawner for ThreadSpawner<S, L>
where
    S: IndexSource + Send + Sync + 'static,
    L: QuerierLoader + Send + Sync + 'static,
{
    fn spawn(&self, init: WorkerInit, events: EventSink) -> Result<Box<dyn WorkerHandle>> {
        let (requests, inbox) = mpsc::unbounded_channel();
        let source = Arc::clone(&self.source);
        let loader = Arc::clone(&self.loader);

        let thread = std::thread::Builder::new()
            .name("protosearch-worker".to_string())
            .spawn(move || run_thread(init, source.as_ref(), loader.as_ref(), inbox, events))
            .map_err(ChannelError::spawn)?;

        Ok(Box::new(ThreadWorker {
            requests: Some(requests),
            thread: Some(thread),
        }))
    }
}

fn run_thread<S, L>(
    init: WorkerInit,
    source: &S,
    loader: &L,
    mut inbox: mpsc::UnboundedReceiver<Request>,
    events: EventSink,
) where
    S: IndexSource,
    L: QuerierLoader,
{
    let index = index_name(&init.url);
    info!(%index, warmup = init.warmup, "Search worker started");

    let loaded = index_location(&init.url)
        .and_then(|location| source.fetch(&location))
        .and_then(|bytes| loader.load(bytes));

    let mut core = WorkerCore::new();
    for message in core.on_loaded(loaded, init.warmup) {
        if events.send(message).is_err() {
            return;
        }
    }

    while let Some(request) = inbox.blocking_recv() {
        let Some(message) = core.on_request(request) else {
            continue;
        };
        if events.send(message).is_err() {
            break;
        }
    }

    debug!(%index, "Search worker stopped");
}

/// Handle to a worker thread.
///
/// Terminating closes the request queue; the thread finishes the request it is
/// working on and exits. It is never joined, so a hung index fetch cannot block
/// the page.
struct ThreadWorker {
    requests: Option<mpsc::UnboundedSender<Request>>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle for ThreadWorker {
    fn post(&mut self, request: Request) -> Result<()> {
        let requests = self.requests.as_ref().ok_or(ChannelError::Disposed)?;
        requests.send(request).map_err(|_| ChannelError::WorkerGone)
    }

    fn terminate(&mut self) {
        self.requests.take();
        self.thread.take();
    }
}

impl Drop for ThreadWorker {
    fn drop(&mut self) {
        self.terminate();
    }
}
