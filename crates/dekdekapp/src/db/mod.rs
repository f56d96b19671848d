//! # Relational Store
//!
//! Users, comments, ratings and uploaded media live in SQLite, unlike the catalog
//! which stays in flat JSON files.
//!
//! ## Connection
//!
//! A single [`rusqlite::Connection`] sits behind a mutex. Every call takes the lock
//! for the duration of its statements, so callers never see a half-applied
//! multi-statement write from another request. Foreign keys are enforced.
//!
//! ## Transactions
//!
//! Writes that need more than one statement (check-then-insert, upserts followed
//! by a read-back) run in an explicit transaction. An uncommitted
//! [`rusqlite::Transaction`] rolls back when dropped, so any `?` between `BEGIN`
//! and `commit()` leaves the database as it was.
//!
//! ## Schema
//!
//! ```text
//! users     (id, username UNIQUE, email UNIQUE, is_admin, created_at)
//! comments  (id, user_id → users, content_type, content_id, body, is_approved, created_at)
//! ratings   (id, user_id → users, content_type, content_id, value 1..=5, created_at,
//!            UNIQUE(user_id, content_type, content_id))
//! media     (id, filename, original_filename, file_type, file_path, file_size,
//!            title, description, is_featured, uploaded_at)
//! ```
//!
//! Comments and ratings point at catalog records through `(content_type, content_id)`;
//! there is no foreign key across the two stores.

use crate::error::{DekError, Result};
use rusqlite::{Connection, ErrorCode};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

pub mod comments;
pub mod media;
pub mod ratings;
pub mod users;

pub use comments::{Comment, CommentFilter, NewComment};
pub use media::{Media, MediaKind, MediaPatch, NewMedia};
pub use ratings::{NewRating, Rating};
pub use users::{NewUser, User, UserPatch};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL UNIQUE,
    is_admin    INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    content_type  TEXT NOT NULL,
    content_id    INTEGER NOT NULL,
    body          TEXT NOT NULL,
    is_approved   INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comments_content ON comments(content_type, content_id);

CREATE TABLE IF NOT EXISTS ratings (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    content_type  TEXT NOT NULL,
    content_id    INTEGER NOT NULL,
    value         INTEGER NOT NULL CHECK (value BETWEEN 1 AND 5),
    created_at    TEXT NOT NULL,
    UNIQUE (user_id, content_type, content_id)
);
CREATE INDEX IF NOT EXISTS idx_ratings_content ON ratings(content_type, content_id);

CREATE TABLE IF NOT EXISTS media (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    filename           TEXT NOT NULL,
    original_filename  TEXT NOT NULL,
    file_type          TEXT NOT NULL,
    file_path          TEXT NOT NULL,
    file_size          INTEGER NOT NULL,
    title              TEXT NOT NULL DEFAULT '',
    description        TEXT NOT NULL DEFAULT '',
    is_featured        INTEGER NOT NULL DEFAULT 0,
    uploaded_at        TEXT NOT NULL
);
"#;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (creating if needed) the database file and its schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(DekError::Io)?;
            }
        }
        info!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Turns unique-constraint violations into `Conflict`, everything else into `Database`.
pub(crate) fn conflict_or_db(err: rusqlite::Error, what: &str) -> DekError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            DekError::Conflict(what.to_string())
        }
        _ => DekError::Database(err),
    }
}
