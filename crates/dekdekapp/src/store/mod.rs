//! # Storage Layer
//!
//! The catalog lives in flat JSON files, one per [`Collection`]. This module owns
//! reading and writing those documents; it knows nothing about HTTP or users.
//!
//! ## Split
//!
//! - [`backend::StorageBackend`]: raw document I/O, the "how".
//!   - [`fs_backend::FsBackend`]: files under a data directory.
//!   - [`mem_backend::MemBackend`]: in-memory documents for tests, with write
//!     failure simulation.
//! - [`record_store::RecordStore`]: the "what", generic over any backend:
//!   - **Seeding**: a collection whose document is absent is created with the
//!     record kind's seed sequence on first load.
//!   - **Soft failures**: [`RecordStore::load`] never fails (malformed content is
//!     logged and read as empty), [`RecordStore::save`] returns `false` instead of
//!     an error. `try_load` / `try_save` expose the underlying errors.
//!   - **Id assignment**: [`RecordStore::next_id`] hands out one past the highest
//!     id present or seen so far, so ids are never reused within a process.
//!   - **Serialization**: [`RecordStore::lock`] hands out one mutex per collection;
//!     mutating commands hold it across their load/modify/save cycle.
//!
//! ## File Format
//!
//! ```text
//! data/
//! ├── books.json     # [ { "id": 1, "title": ..., ... }, ... ]
//! └── quotes.json    # [ { "id": 1, "text": ..., ... }, ... ]
//! ```
//!
//! Documents are pretty-printed with two-space indentation and keep non-ASCII
//! characters as-is. Writes go to a temp file first and are renamed into place.
//! There is no cross-process locking: two processes writing the same data
//! directory race at file granularity (last write wins).
//!
//! [`Collection`]: crate::model::Collection

pub mod backend;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod record_store;

pub use record_store::RecordStore;
