use super::backend::StorageBackend;
use crate::error::{DekError, Result};
use crate::model::Collection;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// In-memory storage backend for testing.
///
/// Uses a `Mutex` since the HTTP layer shares the store across worker threads.
#[derive(Default)]
pub struct MemBackend {
    documents: Mutex<HashMap<Collection, String>>,
    simulate_write_error: AtomicBool,
    writes: AtomicUsize,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Test helper to place a raw document, bypassing serialization.
    pub fn put_raw(&self, collection: Collection, content: &str) {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(collection, content.to_string());
    }

    /// Test helper returning the raw document as last written.
    pub fn raw(&self, collection: Collection) -> Option<String> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&collection)
            .cloned()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StorageBackend for MemBackend {
    fn read_collection(&self, collection: Collection) -> Result<Option<String>> {
        Ok(self.raw(collection))
    }

    fn write_collection(&self, collection: Collection, content: &str) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(DekError::Store("Simulated write error".to_string()));
        }
        self.put_raw(collection, content);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        PathBuf::from(format!("memory://{}", collection.file_name()))
    }
}
