use crate::error::{DekError, Result};
use crate::model::Record;
use crate::store::backend::StorageBackend;
use crate::store::RecordStore;
use chrono::Utc;
use tracing::info;

use super::position_of;

pub fn run<R: Record, B: StorageBackend>(
    store: &RecordStore<B>,
    id: u64,
    patch: R::Patch,
) -> Result<R> {
    R::validate_patch(&patch)?;

    let _guard = store.lock(R::COLLECTION);
    let mut records: Vec<R> = store.try_load()?;

    let index = position_of(&records, id).ok_or(DekError::RecordNotFound {
        collection: R::COLLECTION,
        id,
    })?;
    records[index].apply_patch(patch, Utc::now());
    let updated = records[index].clone();

    if !store.save(&records) {
        return Err(DekError::SaveFailed(R::COLLECTION));
    }
    info!(collection = %R::COLLECTION, id, "record updated");
    Ok(updated)
}
