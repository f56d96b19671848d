//! # Initialization
//!
//! [`initialize`] turns an [`AppConfig`] into a ready [`DekApi`]:
//!
//! 1. open the catalog store under `data_dir` and make sure both collection files
//!    exist and parse (missing ones are seeded)
//! 2. open the SQLite database at `database_path`, creating its schema
//! 3. create the primary administrator account if it does not exist yet
//! 4. create the upload subfolders (`images/`, `videos/`, `books/`)
//!
//! Every step is idempotent, so the server runs it on each start and `dekdek init`
//! is only a way to do it ahead of time. Unlike a plain read, a malformed catalog
//! file is an error here rather than an empty collection.

use crate::api::DekApi;
use crate::config::AppConfig;
use crate::db::{Database, MediaKind};
use crate::error::Result;
use crate::model::{Book, Quote};
use crate::store::fs::FileStore;
use crate::store::fs_backend::FsBackend;
use std::fs;
use tracing::info;

pub fn initialize(config: &AppConfig) -> Result<DekApi<FsBackend>> {
    let store = FileStore::new(config.data_dir.clone());
    let books: Vec<Book> = store.try_load()?;
    let quotes: Vec<Quote> = store.try_load()?;
    info!(
        data_dir = %config.data_dir.display(),
        books = books.len(),
        quotes = quotes.len(),
        "catalog ready"
    );

    let db = Database::open(&config.database_path)?;
    db.ensure_admin(&config.admin_username, &config.admin_email)?;

    for kind in [MediaKind::Image, MediaKind::Video, MediaKind::Document] {
        fs::create_dir_all(config.upload_dir.join(kind.subfolder()))?;
    }

    Ok(DekApi::new(store, db, config.upload_dir.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DekError;
    use std::path::Path;

    fn config_in(root: &Path) -> AppConfig {
        AppConfig {
            bind: "127.0.0.1:0".into(),
            data_dir: root.join("data"),
            database_path: root.join("data").join("app.db"),
            upload_dir: root.join("uploads"),
            max_upload_bytes: 1024,
            admin_username: "admin".into(),
            admin_email: "admin@dek-dek.com".into(),
            admin_password: "pw".into(),
            log_filter: "info".into(),
        }
    }

    #[test]
    fn creates_everything_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let api = initialize(&config).unwrap();
        assert!(config.data_dir.join("books.json").exists());
        assert!(config.data_dir.join("quotes.json").exists());
        assert!(config.upload_dir.join("images").is_dir());
        assert!(config.upload_dir.join("books").is_dir());
        assert_eq!(api.db().count_users().unwrap(), (1, 1));
        drop(api);

        let again = initialize(&config).unwrap();
        assert_eq!(again.db().count_users().unwrap(), (1, 1));
        assert_eq!(again.list::<Quote>().len(), 3);
    }

    #[test]
    fn malformed_catalog_stops_initialization() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.data_dir).unwrap();
        fs::write(config.data_dir.join("books.json"), "not json").unwrap();

        let err = initialize(&config).err().unwrap();
        assert!(matches!(err, DekError::Serialization(_)));
    }
}
