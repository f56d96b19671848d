//! # Command Layer
//!
//! The catalog's business logic. Each operation lives in its own submodule as a
//! plain function over a [`RecordStore`](crate::store::RecordStore) (and, for
//! statistics and media, the [`Database`](crate::db::Database)).
//!
//! ## Shape of a Catalog Command
//!
//! Every catalog command follows the same cycle:
//!
//! 1. take the collection lock (mutations only)
//! 2. load the whole collection
//! 3. operate on it in memory
//! 4. save the whole collection (mutations only)
//!
//! Reads use the soft [`load`](crate::store::RecordStore::load); mutations use
//! `try_load` so a malformed document is reported instead of being overwritten.
//!
//! ## Results
//!
//! Commands return `Result<T>` where `T` is a domain type. Expected conditions
//! (unknown id, invalid input) come back as [`DekError`](crate::error::DekError)
//! variants the caller matches on; a failed save after an in-memory change is
//! [`DekError::SaveFailed`](crate::error::DekError::SaveFailed), never a silent success.
//!
//! ## Lookup
//!
//! Records are found by linear scan on `id`. If a corrupted document holds the
//! same id twice, every command acts on the first match.
//!
//! ## Command Modules
//!
//! - [`create`]: append a record with a fresh id
//! - [`get`]: list, fetch by id, pick at random
//! - [`update`]: apply a sparse patch
//! - [`delete`]: remove a record
//! - [`stats`]: comment/rating aggregates and the admin dashboard
//! - [`media`]: uploaded file storage

pub mod create;
pub mod delete;
pub mod get;
pub mod media;
pub mod stats;
pub mod update;

/// Index of the first record with the given id.
pub(crate) fn position_of<R: crate::model::Record>(records: &[R], id: u64) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}
