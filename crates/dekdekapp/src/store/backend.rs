use crate::error::Result;
use crate::model::Collection;
use std::path::PathBuf;

/// Abstract interface for raw collection I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while RecordStore handles the "what" (seeding, id assignment, soft failures).
pub trait StorageBackend: Send + Sync {
    /// Read the raw JSON document of a collection.
    /// Returns Ok(None) if the collection has never been written.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read_collection(&self, collection: Collection) -> Result<Option<String>>;

    /// Replace the whole document of a collection.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_collection(&self, collection: Collection, content: &str) -> Result<()>;

    /// Where the collection lives. For MemBackend, a virtual path.
    fn collection_path(&self, collection: Collection) -> PathBuf;
}
