//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the relational
//! store. It is the single entry point the HTTP server (or any other front end)
//! talks to.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Dispatches** to the matching command function or database call
//! - **Ties the two stores together**: comments, ratings and stats are only
//!   accepted for catalog records that exist
//! - **Returns domain types** (`Result<Book>`, `Result<Vec<Comment>>`, ...)
//!
//! It does no I/O formatting and knows nothing about HTTP. Status codes come from
//! [`DekError::status_code`](crate::error::DekError::status_code).
//!
//! ## Generic Over the Backend
//!
//! `DekApi<B: StorageBackend>` is generic over where catalog files live:
//! - Production: `DekApi<FsBackend>`
//! - Testing: `DekApi<MemBackend>` with [`Database::open_in_memory`]
//!
//! Catalog methods are additionally generic over the record kind
//! (`api.get::<Book>(1)`), so the same call path serves every collection.

use crate::commands::{self, media::MediaUpload, stats::DashboardStats};
use crate::db::{
    Comment, CommentFilter, Database, Media, MediaPatch, NewComment, NewRating, NewUser, Rating,
    User, UserPatch,
};
use crate::error::Result;
use crate::model::{Record, StatAggregate, WithStats};
use crate::store::backend::StorageBackend;
use crate::store::RecordStore;
use std::path::{Path, PathBuf};

pub struct DekApi<B: StorageBackend> {
    store: RecordStore<B>,
    db: Database,
    upload_dir: PathBuf,
}

impl<B: StorageBackend> DekApi<B> {
    pub fn new(store: RecordStore<B>, db: Database, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            db,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    // --- Catalog ---

    pub fn list<R: Record>(&self) -> Vec<R> {
        commands::get::list(&self.store)
    }

    pub fn list_with_stats<R: Record>(&self) -> Vec<WithStats<R>> {
        commands::stats::attach_stats(self.list(), &self.db)
    }

    pub fn get<R: Record>(&self, id: u64) -> Result<R> {
        commands::get::read_one(&self.store, id)
    }

    pub fn get_with_stats<R: Record>(&self, id: u64) -> Result<WithStats<R>> {
        let record: R = self.get(id)?;
        let stats = commands::stats::stats_for(&self.db, R::COLLECTION.content_type(), id);
        Ok(WithStats { record, stats })
    }

    pub fn random<R: Record>(&self) -> Result<R> {
        commands::get::random(&self.store)
    }

    pub fn create<R: Record>(&self, draft: R::Draft) -> Result<R> {
        commands::create::run(&self.store, draft)
    }

    pub fn update<R: Record>(&self, id: u64, patch: R::Patch) -> Result<R> {
        commands::update::run(&self.store, id, patch)
    }

    pub fn delete<R: Record>(&self, id: u64) -> Result<R> {
        commands::delete::run(&self.store, id)
    }

    // --- Engagement ---

    pub fn stats<R: Record>(&self, id: u64) -> Result<StatAggregate> {
        self.get::<R>(id)?;
        Ok(commands::stats::stats_for(
            &self.db,
            R::COLLECTION.content_type(),
            id,
        ))
    }

    /// Approved comments on a record.
    pub fn comments<R: Record>(&self, id: u64) -> Result<Vec<Comment>> {
        self.get::<R>(id)?;
        self.db.approved_comments(R::COLLECTION.content_type(), id)
    }

    pub fn add_comment<R: Record>(&self, id: u64, comment: NewComment) -> Result<Comment> {
        self.get::<R>(id)?;
        self.db.add_comment(R::COLLECTION.content_type(), id, comment)
    }

    pub fn rate<R: Record>(&self, id: u64, rating: NewRating) -> Result<Rating> {
        self.get::<R>(id)?;
        self.db.rate(R::COLLECTION.content_type(), id, rating)
    }

    pub fn list_comments(&self, filter: CommentFilter) -> Result<Vec<Comment>> {
        self.db.list_comments(filter)
    }

    pub fn approve_comment(&self, id: i64) -> Result<Comment> {
        self.db.set_comment_approval(id, true)
    }

    /// Sends a comment back to pending, whatever its current state.
    pub fn reject_comment(&self, id: i64) -> Result<Comment> {
        self.db.set_comment_approval(id, false)
    }

    pub fn delete_comment(&self, id: i64) -> Result<()> {
        self.db.delete_comment(id)
    }

    // --- Users ---

    pub fn create_user(&self, user: NewUser) -> Result<User> {
        self.db.create_user(user)
    }

    pub fn get_user(&self, id: i64) -> Result<User> {
        self.db.get_user(id)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.db.list_users()
    }

    pub fn update_user(&self, id: i64, patch: UserPatch) -> Result<User> {
        self.db.update_user(id, patch)
    }

    pub fn delete_user(&self, id: i64, protected_username: &str) -> Result<()> {
        self.db.delete_user(id, protected_username)
    }

    pub fn ensure_admin(&self, username: &str, email: &str) -> Result<User> {
        self.db.ensure_admin(username, email)
    }

    // --- Media ---

    pub fn list_media(&self) -> Result<Vec<Media>> {
        self.db.list_media()
    }

    pub fn featured_media(&self) -> Result<Vec<Media>> {
        self.db.featured_media()
    }

    pub fn upload_media(&self, upload: MediaUpload) -> Result<Media> {
        commands::media::upload(&self.db, &self.upload_dir, upload)
    }

    pub fn update_media(&self, id: i64, patch: MediaPatch) -> Result<Media> {
        self.db.update_media(id, patch)
    }

    pub fn delete_media(&self, id: i64) -> Result<Media> {
        commands::media::remove(&self.db, &self.upload_dir, id)
    }

    // --- Admin ---

    pub fn dashboard(&self) -> Result<DashboardStats> {
        commands::stats::dashboard(&self.store, &self.db)
    }
}
