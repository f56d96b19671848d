use super::backend::StorageBackend;
use crate::error::{DekError, Result};
use crate::model::{Collection, Record};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

pub struct RecordStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    books_lock: Mutex<()>,
    quotes_lock: Mutex<()>,
    /// Highest id issued or observed per collection during this process.
    high_water: Mutex<HashMap<Collection, u64>>,
}

impl<B: StorageBackend> RecordStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            books_lock: Mutex::new(()),
            quotes_lock: Mutex::new(()),
            high_water: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.backend.collection_path(collection)
    }

    /// Serializes load/modify/save cycles on one collection.
    /// The guard protects no data, so a poisoned lock is simply taken over.
    pub fn lock(&self, collection: Collection) -> MutexGuard<'_, ()> {
        let slot = match collection {
            Collection::Books => &self.books_lock,
            Collection::Quotes => &self.quotes_lock,
        };
        slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads a collection, never failing.
    ///
    /// - missing document: the seed sequence is persisted and returned
    /// - malformed document: logged, empty sequence returned
    pub fn load<R: Record>(&self) -> Vec<R> {
        let collection = R::COLLECTION;
        match self.read_records::<R>() {
            Ok(Some(records)) => records,
            Ok(None) => {
                let seed = R::seed();
                info!(%collection, count = seed.len(), "seeding missing collection");
                if !self.save(&seed) {
                    warn!(%collection, "seed could not be persisted, serving it from memory");
                }
                seed
            }
            Err(e) => {
                warn!(%collection, error = %e, "could not load collection, treating it as empty");
                Vec::new()
            }
        }
    }

    /// Loads a collection, reporting malformed or unreadable documents as errors.
    /// A missing document is still seeded.
    pub fn try_load<R: Record>(&self) -> Result<Vec<R>> {
        match self.read_records::<R>()? {
            Some(records) => Ok(records),
            None => {
                let seed = R::seed();
                info!(collection = %R::COLLECTION, count = seed.len(), "seeding missing collection");
                self.try_save(&seed)?;
                Ok(seed)
            }
        }
    }

    /// Overwrites a collection. Returns false on failure, which is logged.
    pub fn save<R: Record>(&self, records: &[R]) -> bool {
        match self.try_save(records) {
            Ok(()) => true,
            Err(e) => {
                warn!(collection = %R::COLLECTION, error = %e, "could not save collection");
                false
            }
        }
    }

    pub fn try_save<R: Record>(&self, records: &[R]) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;
        self.backend.write_collection(R::COLLECTION, &content)?;
        self.observe(R::COLLECTION, records);
        debug!(collection = %R::COLLECTION, count = records.len(), "collection saved");
        Ok(())
    }

    /// Next id for a collection: one past the highest id present or ever seen.
    /// Fails once the highest id is `u64::MAX`.
    pub fn next_id<R: Record>(&self, records: &[R]) -> Result<u64> {
        self.observe(R::COLLECTION, records);
        let high_water = self
            .high_water
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        high_water
            .get(&R::COLLECTION)
            .copied()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| DekError::Conflict(format!("no ids left in {}", R::COLLECTION)))
    }

    fn read_records<R: Record>(&self) -> Result<Option<Vec<R>>> {
        let Some(content) = self.backend.read_collection(R::COLLECTION)? else {
            return Ok(None);
        };
        let records: Vec<R> = serde_json::from_str(&content)?;
        self.observe(R::COLLECTION, &records);
        Ok(Some(records))
    }

    fn observe<R: Record>(&self, collection: Collection, records: &[R]) {
        let max = records.iter().map(Record::id).max().unwrap_or(0);
        let mut high_water = self
            .high_water
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = high_water.entry(collection).or_insert(0);
        if max > *entry {
            *entry = max;
        }
    }
}
