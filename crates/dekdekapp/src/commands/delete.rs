use crate::error::{DekError, Result};
use crate::model::Record;
use crate::store::backend::StorageBackend;
use crate::store::RecordStore;
use tracing::info;

use super::position_of;

/// Removes the first record with `id` and returns it.
pub fn run<R: Record, B: StorageBackend>(store: &RecordStore<B>, id: u64) -> Result<R> {
    let _guard = store.lock(R::COLLECTION);
    let mut records: Vec<R> = store.try_load()?;

    let index = position_of(&records, id).ok_or(DekError::RecordNotFound {
        collection: R::COLLECTION,
        id,
    })?;
    let removed = records.remove(index);

    if !store.save(&records) {
        return Err(DekError::SaveFailed(R::COLLECTION));
    }
    info!(collection = %R::COLLECTION, id, "record deleted");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::get;
    use crate::model::{Book, Collection, Quote};
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn deleted_record_is_no_longer_found() {
        let fixture = StoreFixture::new().with_quotes(&["a", "b"]);
        let removed: Quote = run(&fixture.store, 1).unwrap();
        assert_eq!(removed.text(), "a");
        assert!(get::read_one::<Quote, _>(&fixture.store, 1).is_err());
        assert_eq!(get::list::<Quote, _>(&fixture.store).len(), 1);
    }

    #[test]
    fn deleting_missing_id_leaves_collection_untouched() {
        let fixture = StoreFixture::new().with_books(&["a", "b"]);
        let before = fixture.store.backend().raw(Collection::Books);
        let writes = fixture.store.backend().write_count();

        let err = run::<Book, _>(&fixture.store, 99).unwrap_err();
        assert!(matches!(err, DekError::RecordNotFound { id: 99, .. }));
        assert_eq!(fixture.store.backend().raw(Collection::Books), before);
        assert_eq!(fixture.store.backend().write_count(), writes);
    }

    #[test]
    fn removes_only_the_first_duplicate() {
        let fixture = StoreFixture::new();
        fixture.store.backend().put_raw(
            Collection::Quotes,
            r#"[{"id": 1, "text": "first"}, {"id": 1, "text": "second"}]"#,
        );
        run::<Quote, _>(&fixture.store, 1).unwrap();
        let quotes: Vec<Quote> = get::list(&fixture.store);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].text(), "second");
    }

    #[test]
    fn save_failure_is_reported() {
        let fixture = StoreFixture::new().with_quotes(&["a"]);
        fixture.store.backend().set_simulate_write_error(true);
        let err = run::<Quote, _>(&fixture.store, 1).unwrap_err();
        assert!(matches!(err, DekError::SaveFailed(_)));
    }
}
