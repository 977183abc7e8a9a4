//! The page side of the query channel.
//!
//! Every request is tagged with a sequence number. A response is delivered
//! only if it answers the most recent request, so the page always reflects the
//! latest query no matter in which order the worker's answers arrive.

use protosearch_core::{Config, Hit};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};
use url::Url;

use crate::{
    error::{ChannelError, Result},
    protocol::{Request, WorkerInit, WorkerMessage, worker_url},
    worker::{WorkerHandle, WorkerSpawner},
};

/// Engine availability as last reported by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    /// The index is still being fetched and decoded.
    Loading,
    /// Queries are being answered.
    Ready,
    /// The index failed to load.
    Unavailable(String),
}

/// Hits answering the latest request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBatch {
    /// Sequence number of the request.
    pub seq: u64,
    /// Query text of the request.
    pub query: String,
    /// Hits in engine rank order.
    pub hits: Vec<Hit>,
}

/// Something the page should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The engine became ready.
    Ready,
    /// The engine will never answer.
    Unavailable(String),
    /// Fresh results for the latest request.
    Results(ResultBatch),
}

/// Channel to one search worker.
pub struct QueryChannel {
    worker: Option<Box<dyn WorkerHandle>>,
    events: mpsc::UnboundedReceiver<WorkerMessage>,
    worker_url: Url,
    last_seq: u64,
    last_query: String,
    status: EngineStatus,
}

impl QueryChannel {
    /// Start the worker for `config`.
    ///
    /// `warmup` should be false when an initial query is about to be sent; the
    /// real query then loads the index.
    pub fn open(config: &Config, spawner: &dyn WorkerSpawner, warmup: bool) -> Result<Self> {
        let url = worker_url(config.script_url(), config.worker_params())?;
        let (sink, events) = mpsc::unbounded_channel();

        debug!(worker_url = %url, warmup, "Starting search worker");
        let worker = spawner.spawn(
            WorkerInit {
                url: url.clone(),
                warmup,
            },
            sink,
        )?;

        Ok(Self {
            worker: Some(worker),
            events,
            worker_url: url,
            last_seq: 0,
            last_query: String::new(),
            status: EngineStatus::Loading,
        })
    }

    /// Send a query. The empty string clears the results.
    ///
    /// Returns the sequence number assigned to the request.
    pub fn send(&mut self, query: &str) -> Result<u64> {
        let worker = self.worker.as_mut().ok_or(ChannelError::Disposed)?;

        let seq = self.last_seq + 1;
        worker.post(Request {
            seq,
            query: query.to_string(),
        })?;

        trace!(seq, query, "Sent search request");
        self.last_seq = seq;
        self.last_query = query.to_string();
        Ok(seq)
    }

    /// Make every response still in flight stale, without contacting the
    /// worker.
    ///
    /// Used when the page clears the input itself. Consumes one sequence
    /// number, so the next request still gets a larger one.
    pub fn invalidate(&mut self) {
        self.last_seq += 1;
        self.last_query.clear();
        trace!(seq = self.last_seq, "Invalidated in-flight requests");
    }

    /// Sequence number of the latest request, if any was sent.
    pub fn last_sent(&self) -> Option<u64> {
        (self.last_seq > 0).then_some(self.last_seq)
    }

    /// Engine status as last reported.
    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    /// Resource URL the worker was started with.
    pub fn worker_url(&self) -> &Url {
        &self.worker_url
    }

    /// Whether [`QueryChannel::dispose`] was called.
    pub fn is_disposed(&self) -> bool {
        self.worker.is_none()
    }

    /// Next event already received, without waiting. Stale responses are
    /// skipped.
    pub fn try_next(&mut self) -> Option<ChannelEvent> {
        while let Ok(message) = self.events.try_recv() {
            if let Some(event) = self.accept(message) {
                return Some(event);
            }
        }
        None
    }

    /// Wait for the next event. Returns `None` once the worker is gone.
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        while let Some(message) = self.events.recv().await {
            if let Some(event) = self.accept(message) {
                return Some(event);
            }
        }
        None
    }

    /// Blocking variant of [`QueryChannel::next`] for non-async callers.
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_next(&mut self) -> Option<ChannelEvent> {
        while let Some(message) = self.events.blocking_recv() {
            if let Some(event) = self.accept(message) {
                return Some(event);
            }
        }
        None
    }

    /// Deliver every received result batch to `handler`, in order.
    ///
    /// Status events update [`QueryChannel::status`] on the way. Returns the
    /// number of batches delivered.
    pub fn on_result(&mut self, mut handler: impl FnMut(ResultBatch)) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.try_next() {
            if let ChannelEvent::Results(batch) = event {
                handler(batch);
                delivered += 1;
            }
        }
        delivered
    }

    /// Terminate the worker. Later sends fail with [`ChannelError::Disposed`].
    pub fn dispose(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.terminate();
            debug!(worker_url = %self.worker_url, "Search worker terminated");
        }
    }

    fn accept(&mut self, message: WorkerMessage) -> Option<ChannelEvent> {
        match message {
            WorkerMessage::Started => None,
            WorkerMessage::Ready => {
                self.status = EngineStatus::Ready;
                Some(ChannelEvent::Ready)
            }
            WorkerMessage::Unavailable { reason } => {
                warn!(%reason, "Search unavailable");
                self.status = EngineStatus::Unavailable(reason.clone());
                Some(ChannelEvent::Unavailable(reason))
            }
            WorkerMessage::Results { seq, hits } if seq == self.last_seq => {
                // A worker that answers is ready even if `Ready` got lost.
                if self.status == EngineStatus::Loading {
                    self.status = EngineStatus::Ready;
                }
                Some(ChannelEvent::Results(ResultBatch {
                    seq,
                    query: self.last_query.clone(),
                    hits,
                }))
            }
            WorkerMessage::Results { seq, .. } if seq < self.last_seq => {
                debug!(seq, latest = self.last_seq, "Dropping stale response");
                None
            }
            WorkerMessage::Results { seq, .. } => {
                warn!(seq, latest = self.last_seq, "Dropping response to unknown request");
                None
            }
        }
    }
}

impl Drop for QueryChannel {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for QueryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryChannel")
            .field("worker_url", &self.worker_url.as_str())
            .field("last_seq", &self.last_seq)
            .field("status", &self.status)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use protosearch_core::PageAttributes;

    use super::*;
    use crate::worker::EventSink;

    /// Records requests and lets the test play the worker.
    #[derive(Clone, Default)]
    struct Scripted {
        requests: Rc<RefCell<Vec<Request>>>,
        init: Rc<RefCell<Option<WorkerInit>>>,
        sink: Rc<RefCell<Option<EventSink>>>,
        terminated: Rc<RefCell<bool>>,
    }

    impl Scripted {
        fn emit(&self, message: WorkerMessage) {
            self.sink
                .borrow()
                .as_ref()
                .expect("worker spawned")
                .send(message)
                .expect("channel alive");
        }

        fn results(&self, seq: u64, path: &str) {
            self.emit(WorkerMessage::Results {
                seq,
                hits: vec![Hit::new(1.0).with_field("path", path)],
            });
        }
    }

    struct ScriptedHandle(Scripted);

    impl WorkerHandle for ScriptedHandle {
        fn post(&mut self, request: Request) -> Result<()> {
            self.0.requests.borrow_mut().push(request);
            Ok(())
        }

        fn terminate(&mut self) {
            *self.0.terminated.borrow_mut() = true;
        }
    }

    impl WorkerSpawner for Scripted {
        fn spawn(&self, init: WorkerInit, events: EventSink) -> Result<Box<dyn WorkerHandle>> {
            *self.init.borrow_mut() = Some(init);
            *self.sink.borrow_mut() = Some(events);
            Ok(Box::new(ScriptedHandle(self.clone())))
        }
    }

    fn config(query_string: &str) -> Config {
        let script = Url::parse("https://example.com/docs/search/search.js").unwrap();
        Config::resolve(&PageAttributes::new(), query_string, &script).unwrap()
    }

    fn batch_path(event: Option<ChannelEvent>) -> String {
        match event {
            Some(ChannelEvent::Results(batch)) => batch.hits[0].field("path").unwrap().to_string(),
            other => panic!("Expected results, got {other:?}"),
        }
    }

    #[test]
    fn test_open_builds_worker_url() {
        let worker = Scripted::default();
        let channel = QueryChannel::open(&config("index=api"), &worker, true).unwrap();

        let init = worker.init.borrow().clone().unwrap();
        assert_eq!(init.url.as_str(), "https://example.com/docs/search/worker.js?index=api");
        assert!(init.warmup);
        assert_eq!(channel.worker_url(), &init.url);
        assert_eq!(channel.status(), &EngineStatus::Loading);
    }

    #[test]
    fn test_send_assigns_increasing_sequence_numbers() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, false).unwrap();

        assert_eq!(channel.last_sent(), None);
        assert_eq!(channel.send("a").unwrap(), 1);
        assert_eq!(channel.send("").unwrap(), 2);
        assert_eq!(channel.last_sent(), Some(2));

        let requests = worker.requests.borrow();
        assert_eq!(requests[1], Request { seq: 2, query: String::new() });
    }

    #[test]
    fn test_stale_response_dropped_when_late() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, false).unwrap();

        channel.send("a").unwrap();
        channel.send("b").unwrap();
        worker.results(2, "/b");
        worker.results(1, "/a");

        assert_eq!(batch_path(channel.try_next()), "/b");
        assert_eq!(channel.try_next(), None);
    }

    #[test]
    fn test_stale_response_dropped_when_early() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, false).unwrap();

        channel.send("a").unwrap();
        channel.send("b").unwrap();
        worker.results(1, "/a");
        worker.results(2, "/b");

        assert_eq!(batch_path(channel.try_next()), "/b");
        assert_eq!(channel.try_next(), None);
    }

    #[test]
    fn test_batch_carries_latest_query() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, false).unwrap();

        channel.send("rust").unwrap();
        worker.results(1, "/rust");

        match channel.try_next() {
            Some(ChannelEvent::Results(batch)) => {
                assert_eq!(batch.seq, 1);
                assert_eq!(batch.query, "rust");
            }
            other => panic!("Expected results, got {other:?}"),
        }
    }

    #[test]
    fn test_status_events() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, true).unwrap();

        worker.emit(WorkerMessage::Ready);
        assert_eq!(channel.try_next(), Some(ChannelEvent::Ready));
        assert_eq!(channel.status(), &EngineStatus::Ready);

        worker.emit(WorkerMessage::Unavailable {
            reason: "HTTP 404".to_string(),
        });
        assert_eq!(
            channel.try_next(),
            Some(ChannelEvent::Unavailable("HTTP 404".to_string()))
        );
        assert_eq!(channel.status(), &EngineStatus::Unavailable("HTTP 404".to_string()));
    }

    #[test]
    fn test_on_result_delivers_only_batches() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, true).unwrap();

        channel.send("a").unwrap();
        worker.emit(WorkerMessage::Ready);
        worker.results(1, "/a");

        let mut seen = Vec::new();
        let delivered = channel.on_result(|batch| seen.push(batch.seq));

        assert_eq!(delivered, 1);
        assert_eq!(seen, vec![1]);
        assert_eq!(channel.status(), &EngineStatus::Ready);
    }

    #[test]
    fn test_invalidate_drops_in_flight_responses() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, false).unwrap();

        channel.send("old").unwrap();
        channel.invalidate();
        worker.results(1, "/old");
        assert_eq!(channel.try_next(), None);

        assert_eq!(channel.send("new").unwrap(), 3);
        worker.results(3, "/new");
        assert_eq!(batch_path(channel.try_next()), "/new");
        assert_eq!(worker.requests.borrow().len(), 2);
    }

    #[test]
    fn test_started_is_not_an_event() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, true).unwrap();

        worker.emit(WorkerMessage::Started);
        assert_eq!(channel.try_next(), None);
        assert_eq!(channel.status(), &EngineStatus::Loading);
    }

    #[test]
    fn test_unknown_sequence_dropped() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, false).unwrap();

        channel.send("a").unwrap();
        worker.results(9, "/future");
        assert_eq!(channel.try_next(), None);
    }

    #[test]
    fn test_dispose_terminates_worker() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, false).unwrap();

        channel.dispose();
        assert!(*worker.terminated.borrow());
        assert!(channel.is_disposed());
        assert!(matches!(channel.send("a"), Err(ChannelError::Disposed)));
    }

    #[tokio::test]
    async fn test_async_next() {
        let worker = Scripted::default();
        let mut channel = QueryChannel::open(&config(""), &worker, false).unwrap();

        channel.send("a").unwrap();
        worker.results(1, "/a");

        assert_eq!(batch_path(channel.next().await), "/a");
    }
}
