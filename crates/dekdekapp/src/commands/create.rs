use crate::error::{DekError, Result};
use crate::model::Record;
use crate::store::backend::StorageBackend;
use crate::store::RecordStore;
use chrono::Utc;
use tracing::info;

pub fn run<R: Record, B: StorageBackend>(store: &RecordStore<B>, draft: R::Draft) -> Result<R> {
    R::validate_draft(&draft)?;

    let _guard = store.lock(R::COLLECTION);
    let mut records: Vec<R> = store.try_load()?;

    let id = store.next_id(&records)?;
    let record = R::from_draft(id, draft, Utc::now());
    records.push(record.clone());

    if !store.save(&records) {
        return Err(DekError::SaveFailed(R::COLLECTION));
    }
    info!(collection = %R::COLLECTION, id, "record created");
    Ok(record)
}
