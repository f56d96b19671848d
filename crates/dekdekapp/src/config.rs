//! # Configuration
//!
//! Settings are loaded with [`confique`] from layered sources.
//!
//! ## Sources
//!
//! Resolved in priority order:
//! 1. **Environment variables**: `DEKDEK_BIND`, `DEKDEK_ADMIN_PASSWORD`, etc.
//! 2. **Config file**: the path given with `--config`, otherwise `dekdek.toml` in the
//!    OS config directory (via `directories`). A missing file is skipped.
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! Command-line flags such as `--bind` are applied by the binary after loading.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `bind` | `0.0.0.0:5000` | Address the HTTP server listens on |
//! | `data_dir` | `data` | Directory holding `books.json` and `quotes.json` |
//! | `database_path` | `data/app.db` | SQLite file for users, comments, ratings, media |
//! | `upload_dir` | `uploads` | Root of uploaded media |
//! | `max_upload_bytes` | 100 MiB | Largest accepted request body |
//! | `admin_username` | `admin` | Primary administrator, cannot be deleted |
//! | `admin_email` | `admin@dek-dek.com` | Email of the primary administrator |
//! | `admin_password` | *(required)* | Password for `POST /api/admin/login` |
//! | `log_filter` | `info` | `tracing` filter, overridden by `RUST_LOG` |

use crate::error::{DekError, Result};
use confique::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "dekdek.toml";

#[derive(Config, Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server listens on.
    #[config(env = "DEKDEK_BIND", default = "0.0.0.0:5000")]
    pub bind: String,

    /// Directory holding the catalog collection files.
    #[config(env = "DEKDEK_DATA_DIR", default = "data")]
    pub data_dir: PathBuf,

    /// SQLite database for users, comments, ratings and media.
    #[config(env = "DEKDEK_DATABASE_PATH", default = "data/app.db")]
    pub database_path: PathBuf,

    /// Root directory of uploaded media (images/, videos/, books/).
    #[config(env = "DEKDEK_UPLOAD_DIR", default = "uploads")]
    pub upload_dir: PathBuf,

    /// Largest accepted request body, in bytes.
    #[config(env = "DEKDEK_MAX_UPLOAD_BYTES", default = 104857600)]
    pub max_upload_bytes: u64,

    /// Primary administrator account. It is created at startup and cannot be deleted.
    #[config(env = "DEKDEK_ADMIN_USERNAME", default = "admin")]
    pub admin_username: String,

    #[config(env = "DEKDEK_ADMIN_EMAIL", default = "admin@dek-dek.com")]
    pub admin_email: String,

    /// Password for the admin login. Required.
    #[config(env = "DEKDEK_ADMIN_PASSWORD")]
    pub admin_password: String,

    /// Log filter directive, e.g. "info" or "dekdek=debug,tower_http=info".
    #[config(env = "DEKDEK_LOG_FILTER", default = "info")]
    pub log_filter: String,
}

/// `dekdek.toml` inside the platform config directory, if one can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "dek-dek", "dekdek").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Loads from the environment, then `path` (or the default location), then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        let file = path.map(Path::to_path_buf).or_else(default_config_path);
        if let Some(file) = file {
            builder = builder.file(file);
        }
        builder
            .load()
            .map_err(|e| DekError::Validation(format!("configuration: {}", e)))
    }

    /// Commented TOML template listing every setting.
    pub fn template() -> String {
        confique::toml::template::<Self>(confique::toml::FormatOptions::default())
    }
}
