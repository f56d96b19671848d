use crate::api::DekApi;
use crate::db::Database;
use crate::store::fs::FileStore;
use crate::store::fs_backend::FsBackend;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway on-disk environment: data dir, upload dir and database under one temp dir.
pub struct TestEnv {
    // Kept so the directory lives as long as the env
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(self.data_dir())
    }

    pub fn api(&self) -> DekApi<FsBackend> {
        let db = Database::open(&self.data_dir().join("app.db")).expect("failed to open database");
        DekApi::new(self.store(), db, self.upload_dir())
    }
}
