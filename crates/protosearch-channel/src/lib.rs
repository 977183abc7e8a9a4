//! Protosearch Query Channel
//!
//! Bridges page input to a search engine running off the UI thread.
//!
//! # Overview
//!
//! - [`QueryChannel`]: page side; tags requests, filters stale responses and
//!   tracks the engine status.
//! - [`WorkerCore`]: worker side; loads the index once, warms the engine up and
//!   answers requests in order.
//! - [`ThreadSpawner`]: runs a worker on an OS thread with any
//!   [`IndexSource`] and [`QuerierLoader`].
//!
//! # Example
//!
//! ```no_run
//! use protosearch_channel::{
//!     ChannelEvent, FsIndexSource, LoadError, Querier, QuerierLoader, QueryChannel, QueryError,
//!     ThreadSpawner,
//! };
//! use protosearch_core::{Config, Hit, PageAttributes};
//! use url::Url;
//!
//! struct Empty;
//!
//! impl Querier for Empty {
//!     fn search(&self, _query: &str) -> Result<Vec<Hit>, QueryError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! struct EmptyLoader;
//!
//! impl QuerierLoader for EmptyLoader {
//!     type Querier = Empty;
//!
//!     fn load(&self, _index: Vec<u8>) -> Result<Empty, LoadError> {
//!         Ok(Empty)
//!     }
//! }
//!
//! let script = Url::parse("file:///srv/site/search/search.js").unwrap();
//! let config = Config::resolve(&PageAttributes::new(), "", &script).unwrap();
//! let spawner = ThreadSpawner::new(FsIndexSource::new("/srv/site/search"), EmptyLoader);
//!
//! let mut channel = QueryChannel::open(&config, &spawner, true).unwrap();
//! channel.send("rust").unwrap();
//! while let Some(event) = channel.blocking_next() {
//!     if let ChannelEvent::Results(batch) = event {
//!         println!("{} hits", batch.hits.len());
//!         break;
//!     }
//! }
//! ```

pub mod channel;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod worker;

pub use channel::{ChannelEvent, EngineStatus, QueryChannel, ResultBatch};
pub use engine::{FsIndexSource, IndexSource, MemoryIndexSource, Querier, QuerierLoader};
pub use error::{ChannelError, LoadError, QueryError, Result};
pub use protocol::{Request, WorkerCommand, WorkerInit, WorkerMessage};
pub use worker::{EventSink, ThreadSpawner, WorkerCore, WorkerHandle, WorkerSpawner};
