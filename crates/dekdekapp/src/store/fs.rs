use super::fs_backend::FsBackend;
use super::record_store::RecordStore;
use std::path::PathBuf;

/// Production store: one JSON document per collection under a data directory.
pub type FileStore = RecordStore<FsBackend>;

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        RecordStore::with_backend(FsBackend::new(data_dir))
    }
}
