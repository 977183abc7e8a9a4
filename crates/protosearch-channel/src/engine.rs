//! Seams to the external query engine and to index storage.
//!
//! The engine is opaque: it is handed the raw index bytes once and then
//! answers text queries with hits already sorted by rank.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

use protosearch_core::Hit;
use url::Url;

use crate::error::{LoadError, QueryError};

/// A loaded engine instance answering queries.
pub trait Querier {
    /// Search the index. Hits come back in rank order.
    fn search(&self, query: &str) -> Result<Vec<Hit>, QueryError>;
}

/// Decodes index bytes into a [`Querier`].
pub trait QuerierLoader {
    /// Engine type produced by this loader.
    type Querier: Querier;

    /// Decode an index resource.
    fn load(&self, index: Vec<u8>) -> Result<Self::Querier, LoadError>;
}

/// Fetches the index resource for a worker.
pub trait IndexSource {
    /// Fetch the bytes behind `location`.
    fn fetch(&self, location: &Url) -> Result<Vec<u8>, LoadError>;
}

/// Reads index files from a local directory.
///
/// `file:` locations are read directly; any other location is mapped to its
/// last path segment inside the root directory.
#[derive(Debug, Clone)]
pub struct FsIndexSource {
    root: PathBuf,
}

impl FsIndexSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, location: &Url) -> Result<PathBuf, LoadError> {
        if location.scheme() == "file" {
            return location
                .to_file_path()
                .map_err(|()| LoadError::fetch(location.as_str(), "not a local file path"));
        }

        let file_name = location
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| LoadError::fetch(location.as_str(), "no file name in location"))?;

        Ok(self.root.join(file_name))
    }
}

impl IndexSource for FsIndexSource {
    fn fetch(&self, location: &Url) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(location)?;
        tracing::debug!(path = %path.display(), "Reading index file");

        std::fs::read(&path).map_err(|e| LoadError::fetch(path.display().to_string(), e.to_string()))
    }
}

/// Serves index resources from memory, keyed by file name.
#[derive(Debug, Default)]
pub struct MemoryIndexSource {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryIndexSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a file such as `searchIndex.idx`.
    pub fn with_file(self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add or replace a file.
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut files) = self.files.write() {
            files.insert(name.into(), bytes.into());
        }
    }
}

impl IndexSource for MemoryIndexSource {
    fn fetch(&self, location: &Url) -> Result<Vec<u8>, LoadError> {
        let name = location
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();

        let files = self
            .files
            .read()
            .map_err(|_| LoadError::fetch(location.as_str(), "index store poisoned"))?;

        files
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::fetch(location.as_str(), "HTTP 404"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_source_maps_last_segment() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join("searchIndex.idx"), b"index-bytes").expect("write");

        let source = FsIndexSource::new(dir.path());
        let location = Url::parse("https://example.com/search/searchIndex.idx").unwrap();

        assert_eq!(source.fetch(&location).unwrap(), b"index-bytes");
    }

    #[test]
    fn test_fs_source_reads_file_urls() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("api.idx");
        std::fs::write(&path, b"api").expect("write");

        let source = FsIndexSource::new("/nonexistent");
        let location = Url::from_file_path(&path).unwrap();

        assert_eq!(source.fetch(&location).unwrap(), b"api");
    }

    #[test]
    fn test_fs_source_missing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let source = FsIndexSource::new(dir.path());
        let location = Url::parse("https://example.com/search/missing.idx").unwrap();

        assert!(matches!(source.fetch(&location), Err(LoadError::Fetch { .. })));
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryIndexSource::new().with_file("searchIndex.idx", b"abc".to_vec());
        let found = Url::parse("https://example.com/search/searchIndex.idx").unwrap();
        let missing = Url::parse("https://example.com/search/other.idx").unwrap();

        assert_eq!(source.fetch(&found).unwrap(), b"abc");
        assert!(source.fetch(&missing).unwrap_err().to_string().contains("404"));
    }
}
