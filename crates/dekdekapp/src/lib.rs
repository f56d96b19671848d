//! # dekdekapp Architecture
//!
//! dekdekapp is the content library behind the dek-dek site: a catalog of books and
//! quotes kept in flat JSON files, plus users, moderated comments, ratings and
//! uploaded media kept in SQLite. The HTTP server in the `dekdek` crate is one
//! client of it; nothing here knows about HTTP.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  HTTP Layer (crates/dekdek)                                 │
//! │  - Routing, envelopes, admin sessions, status codes         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands and the database               │
//! │  - Checks catalog records exist before attaching to them    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Catalog CRUD, statistics, media files                    │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                               │
//!                 ▼                               ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Record Store (store/)        │ │  Relational Store (db/)   │
//! │  - StorageBackend trait       │ │  - rusqlite, one          │
//! │  - FsBackend / MemBackend     │ │    connection behind a    │
//! │  - JSON arrays, atomic writes │ │    mutex                  │
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`error::Result`]. Expected conditions (unknown
//! id, bad input, duplicate user) are distinct [`error::DekError`] variants, each
//! with an HTTP-style [`status_code`](error::DekError::status_code).
//!
//! Two operations never fail by contract: loading a collection for reading
//! ([`store::RecordStore::load`]) and computing statistics
//! ([`commands::stats::stats_for`]). Both log through `tracing` and fall back to
//! an empty or zeroed value.
//!
//! ## Testing Strategy
//!
//! - **Commands**: unit tests against `InMemoryStore` and
//!   [`db::Database::open_in_memory`].
//! - **Store**: in-memory tests for behavior, `tempfile` integration tests for the
//!   filesystem backend.
//! - **API**: checks that calls reach the right store and that cross-store rules hold.

pub mod api;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod init;
pub mod model;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
