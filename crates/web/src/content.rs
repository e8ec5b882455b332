//! In-memory payloads served by exact path when no route matched.

use std::collections::HashMap;

use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    content_type: String,
    data: Bytes,
}

impl Content {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self { content_type: content_type.into(), data: data.into() }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Path to payload table. At most one entry per path; adding again replaces it.
#[derive(Debug, Default, Clone)]
pub struct ContentStore {
    entries: HashMap<String, Content>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` under `path`, returning the entry it replaced.
    pub fn add(&mut self, path: impl Into<String>, data: impl Into<Bytes>, content_type: impl Into<String>) -> Option<Content> {
        self.entries.insert(path.into(), Content::new(data, content_type))
    }

    /// Looks up the exact path; no normalization is applied.
    pub fn get(&self, path: &str) -> Option<&Content> {
        self.entries.get(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<Content> {
        self.entries.remove(path)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
