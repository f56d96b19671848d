use crate::error::{DekError, Result};
use crate::model::Record;
use crate::store::backend::StorageBackend;
use crate::store::RecordStore;
use rand::seq::SliceRandom;

use super::position_of;

/// All records of a collection in storage order.
pub fn list<R: Record, B: StorageBackend>(store: &RecordStore<B>) -> Vec<R> {
    store.load()
}

/// First record whose id matches.
pub fn read_one<R: Record, B: StorageBackend>(store: &RecordStore<B>, id: u64) -> Result<R> {
    let mut records: Vec<R> = store.load();
    match position_of(&records, id) {
        Some(index) => Ok(records.swap_remove(index)),
        None => Err(DekError::RecordNotFound {
            collection: R::COLLECTION,
            id,
        }),
    }
}

/// A uniformly chosen record, or NotFound when the collection is empty.
pub fn random<R: Record, B: StorageBackend>(store: &RecordStore<B>) -> Result<R> {
    let records: Vec<R> = store.load();
    records
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| DekError::NotFound(format!("No {} available", R::COLLECTION)))
}
