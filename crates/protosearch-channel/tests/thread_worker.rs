//! End-to-end tests of the query channel over a real worker thread.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use protosearch_channel::{
    ChannelEvent, EngineStatus, LoadError, MemoryIndexSource, Querier, QuerierLoader, QueryChannel,
    QueryError, ThreadSpawner,
};
use protosearch_core::{Config, Hit, PageAttributes};
use url::Url;

/// Engine whose index is a JSON object mapping queries to hit lists.
struct TableQuerier {
    table: HashMap<String, Vec<Hit>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Querier for TableQuerier {
    fn search(&self, query: &str) -> Result<Vec<Hit>, QueryError> {
        self.log.lock().unwrap().push(query.to_string());
        Ok(self.table.get(query).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct TableLoader {
    log: Arc<Mutex<Vec<String>>>,
}

impl QuerierLoader for TableLoader {
    type Querier = TableQuerier;

    fn load(&self, index: Vec<u8>) -> Result<TableQuerier, LoadError> {
        let table = serde_json::from_slice(&index).map_err(|e| LoadError::decode(e.to_string()))?;
        Ok(TableQuerier {
            table,
            log: Arc::clone(&self.log),
        })
    }
}

const INDEX: &str = r#"{
    "a": [{"fields": {"path": "/a", "title": "A"}, "highlights": {}, "score": 1.0}],
    "b": [
        {"fields": {"path": "/b1", "title": "B1"}, "score": 2.0},
        {"fields": {"path": "/b2", "title": "B2"}, "score": 1.0}
    ]
}"#;

fn config(query_string: &str) -> Config {
    let script = Url::parse("https://example.com/docs/search/search.js").unwrap();
    Config::resolve(&PageAttributes::new(), query_string, &script).unwrap()
}

fn spawner(files: &[(&str, &str)]) -> (ThreadSpawner<MemoryIndexSource, TableLoader>, Arc<Mutex<Vec<String>>>) {
    let source = files
        .iter()
        .fold(MemoryIndexSource::new(), |source, (name, body)| {
            source.with_file(*name, body.as_bytes().to_vec())
        });
    let loader = TableLoader::default();
    let log = Arc::clone(&loader.log);
    (ThreadSpawner::new(source, loader), log)
}

fn next_batch(channel: &mut QueryChannel) -> Vec<Hit> {
    while let Some(event) = channel.blocking_next() {
        match event {
            ChannelEvent::Results(batch) => return batch.hits,
            ChannelEvent::Ready => continue,
            ChannelEvent::Unavailable(reason) => panic!("index unavailable: {reason}"),
        }
    }
    panic!("worker stopped without answering");
}

#[test]
fn test_query_round_trip_preserves_engine_order() {
    let (spawner, _) = spawner(&[("searchIndex.idx", INDEX)]);
    let mut channel = QueryChannel::open(&config(""), &spawner, false).unwrap();

    channel.send("b").unwrap();
    let hits = next_batch(&mut channel);

    let paths: Vec<_> = hits.iter().map(|h| h.field("path").unwrap()).collect();
    assert_eq!(paths, vec!["/b1", "/b2"]);
    assert_eq!(channel.status(), &EngineStatus::Ready);
}

#[test]
fn test_warmup_runs_when_requested() {
    let (spawner, log) = spawner(&[("searchIndex.idx", INDEX)]);
    let mut channel = QueryChannel::open(&config(""), &spawner, true).unwrap();

    channel.send("a").unwrap();
    next_batch(&mut channel);

    assert_eq!(*log.lock().unwrap(), vec!["warmup".to_string(), "a".to_string()]);
}

#[test]
fn test_warmup_skipped_for_initial_query() {
    let (spawner, log) = spawner(&[("searchIndex.idx", INDEX)]);
    let mut channel = QueryChannel::open(&config("q=a"), &spawner, false).unwrap();

    channel.send("a").unwrap();
    next_batch(&mut channel);

    assert_eq!(*log.lock().unwrap(), vec!["a".to_string()]);
}

#[test]
fn test_index_parameter_selects_file() {
    let (spawner, _) = spawner(&[("api.idx", INDEX)]);
    let mut channel = QueryChannel::open(&config("index=api"), &spawner, false).unwrap();

    channel.send("a").unwrap();
    assert_eq!(next_batch(&mut channel).len(), 1);
}

#[test]
fn test_empty_query_clears() {
    let (spawner, _) = spawner(&[("searchIndex.idx", INDEX)]);
    let mut channel = QueryChannel::open(&config(""), &spawner, false).unwrap();

    channel.send("a").unwrap();
    assert_eq!(next_batch(&mut channel).len(), 1);

    channel.send("").unwrap();
    assert!(next_batch(&mut channel).is_empty());
}

#[test]
fn test_only_latest_of_rapid_requests_is_delivered() {
    let (spawner, _) = spawner(&[("searchIndex.idx", INDEX)]);
    let mut channel = QueryChannel::open(&config(""), &spawner, false).unwrap();

    channel.send("a").unwrap();
    channel.send("b").unwrap();

    let hits = next_batch(&mut channel);
    assert_eq!(hits[0].field("path"), Some("/b1"));
}

#[test]
fn test_missing_index_reports_unavailable() {
    let (spawner, _) = spawner(&[]);
    let mut channel = QueryChannel::open(&config(""), &spawner, true).unwrap();

    channel.send("a").unwrap();
    match channel.blocking_next() {
        Some(ChannelEvent::Unavailable(reason)) => assert!(reason.contains("searchIndex.idx")),
        other => panic!("Expected unavailable, got {other:?}"),
    }
    assert!(matches!(channel.status(), EngineStatus::Unavailable(_)));
}

#[test]
fn test_undecodable_index_reports_unavailable() {
    let (spawner, _) = spawner(&[("searchIndex.idx", "not json")]);
    let mut channel = QueryChannel::open(&config(""), &spawner, true).unwrap();

    match channel.blocking_next() {
        Some(ChannelEvent::Unavailable(reason)) => assert!(reason.contains("decode")),
        other => panic!("Expected unavailable, got {other:?}"),
    }
}

#[test]
fn test_traversal_index_name_rejected() {
    let (spawner, _) = spawner(&[("searchIndex.idx", INDEX)]);
    let mut channel = QueryChannel::open(&config("index=..%2Fsecret"), &spawner, true).unwrap();

    match channel.blocking_next() {
        Some(ChannelEvent::Unavailable(reason)) => assert!(reason.contains("invalid index name")),
        other => panic!("Expected unavailable, got {other:?}"),
    }
}

#[test]
fn test_dispose_stops_worker() {
    let (spawner, _) = spawner(&[("searchIndex.idx", INDEX)]);
    let mut channel = QueryChannel::open(&config(""), &spawner, false).unwrap();

    channel.dispose();
    assert!(channel.send("a").is_err());
    // Remaining status messages drain, then the closed worker ends the stream.
    while let Some(event) = channel.blocking_next() {
        assert!(!matches!(event, ChannelEvent::Results(_)));
    }
}
