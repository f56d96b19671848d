use super::backend::StorageBackend;
use crate::error::{DekError, Result};
use crate::model::Collection;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct FsBackend {
    data_dir: PathBuf,
}

impl FsBackend {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir).map_err(DekError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn read_collection(&self, collection: Collection) -> Result<Option<String>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(DekError::Io)?;
        Ok(Some(content))
    }

    fn write_collection(&self, collection: Collection, content: &str) -> Result<()> {
        self.ensure_dir()?;
        let target = self.collection_path(collection);

        let tmp_file = self
            .data_dir
            .join(format!(".{}-{}.tmp", collection.name(), Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(DekError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, &target) {
            let _ = fs::remove_file(&tmp_file);
            return Err(DekError::Io(e));
        }
        Ok(())
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }
}
