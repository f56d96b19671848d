use super::Database;
use crate::error::{DekError, Result};
use crate::model::ContentType;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub content_type: ContentType,
    pub content_id: u64,
    pub body: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewComment {
    pub user_id: i64,
    pub body: String,
}

/// Which comments an admin listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentFilter {
    #[default]
    All,
    Pending,
    Approved,
}

const COMMENT_SELECT: &str = "SELECT c.id, c.user_id, u.username, c.content_type, c.content_id, \
     c.body, c.is_approved, c.created_at \
     FROM comments c JOIN users u ON u.id = c.user_id";

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    let content_type: String = row.get(3)?;
    let content_type = ContentType::from_str(&content_type).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let content_id: i64 = row.get(4)?;
    Ok(Comment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        content_type,
        content_id: content_id as u64,
        body: row.get(5)?,
        is_approved: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl Database {
    /// Adds a comment awaiting moderation.
    pub fn add_comment(
        &self,
        content_type: ContentType,
        content_id: u64,
        new: NewComment,
    ) -> Result<Comment> {
        let body = new.body.trim();
        if body.is_empty() {
            return Err(DekError::Validation("comment cannot be empty".to_string()));
        }

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let user_exists = tx
            .query_row("SELECT 1 FROM users WHERE id = ?1", [new.user_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !user_exists {
            return Err(DekError::NotFound(format!("User {}", new.user_id)));
        }
        tx.execute(
            "INSERT INTO comments (user_id, content_type, content_id, body, is_approved, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                new.user_id,
                content_type.as_str(),
                content_id as i64,
                body,
                Utc::now()
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        drop(conn);

        info!(id, %content_type, content_id, "comment submitted for moderation");
        self.get_comment(id)
    }

    pub fn get_comment(&self, id: i64) -> Result<Comment> {
        self.conn()
            .query_row(
                &format!("{COMMENT_SELECT} WHERE c.id = ?1"),
                [id],
                comment_from_row,
            )
            .optional()?
            .ok_or_else(|| DekError::NotFound(format!("Comment {}", id)))
    }

    /// Approved comments of one item, oldest first.
    pub fn approved_comments(&self, content_type: ContentType, content_id: u64) -> Result<Vec<Comment>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{COMMENT_SELECT} WHERE c.content_type = ?1 AND c.content_id = ?2 AND c.is_approved = 1 \
             ORDER BY c.created_at ASC, c.id ASC"
        ))?;
        let comments = stmt
            .query_map(params![content_type.as_str(), content_id as i64], comment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }

    /// Moderation listing, newest first.
    pub fn list_comments(&self, filter: CommentFilter) -> Result<Vec<Comment>> {
        let clause = match filter {
            CommentFilter::All => "",
            CommentFilter::Pending => " WHERE c.is_approved = 0",
            CommentFilter::Approved => " WHERE c.is_approved = 1",
        };
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{COMMENT_SELECT}{clause} ORDER BY c.created_at DESC, c.id DESC"
        ))?;
        let comments = stmt
            .query_map([], comment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }

    /// Moves a comment to approved or back to pending. Either transition is allowed
    /// from either state.
    pub fn set_comment_approval(&self, id: i64, approved: bool) -> Result<Comment> {
        let changed = self.conn().execute(
            "UPDATE comments SET is_approved = ?1 WHERE id = ?2",
            params![approved, id],
        )?;
        if changed == 0 {
            return Err(DekError::NotFound(format!("Comment {}", id)));
        }
        info!(id, approved, "comment moderated");
        self.get_comment(id)
    }

    pub fn delete_comment(&self, id: i64) -> Result<()> {
        let changed = self.conn().execute("DELETE FROM comments WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(DekError::NotFound(format!("Comment {}", id)));
        }
        Ok(())
    }

    pub fn approved_comment_count(&self, content_type: ContentType, content_id: u64) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM comments WHERE content_type = ?1 AND content_id = ?2 AND is_approved = 1",
            params![content_type.as_str(), content_id as i64],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    pub fn pending_comment_count(&self) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM comments WHERE is_approved = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;

    fn db_with_user() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .create_user(NewUser {
                username: "lea".into(),
                email: "lea@example.com".into(),
                is_admin: false,
            })
            .unwrap();
        (db, user.id)
    }

    fn comment(user_id: i64, body: &str) -> NewComment {
        NewComment {
            user_id,
            body: body.to_string(),
        }
    }

    #[test]
    fn new_comments_are_pending_and_hidden() {
        let (db, user) = db_with_user();
        let c = db
            .add_comment(ContentType::Book, 1, comment(user, " Superbe "))
            .unwrap();
        assert!(!c.is_approved);
        assert_eq!(c.body, "Superbe");
        assert_eq!(c.username, "lea");
        assert!(db.approved_comments(ContentType::Book, 1).unwrap().is_empty());
        assert_eq!(db.pending_comment_count().unwrap(), 1);
    }

    #[test]
    fn approval_goes_both_ways() {
        let (db, user) = db_with_user();
        let c = db
            .add_comment(ContentType::Quote, 2, comment(user, "Merci"))
            .unwrap();

        let approved = db.set_comment_approval(c.id, true).unwrap();
        assert!(approved.is_approved);
        assert_eq!(db.approved_comment_count(ContentType::Quote, 2).unwrap(), 1);

        let rejected = db.set_comment_approval(c.id, false).unwrap();
        assert!(!rejected.is_approved);
        assert_eq!(db.approved_comment_count(ContentType::Quote, 2).unwrap(), 0);

        // Rejecting a pending comment is also legal.
        assert!(!db.set_comment_approval(c.id, false).unwrap().is_approved);
    }

    #[test]
    fn counts_are_scoped_to_the_item() {
        let (db, user) = db_with_user();
        for (ct, id) in [(ContentType::Book, 1), (ContentType::Book, 2), (ContentType::Quote, 1)] {
            let c = db.add_comment(ct, id, comment(user, "x")).unwrap();
            db.set_comment_approval(c.id, true).unwrap();
        }
        assert_eq!(db.approved_comment_count(ContentType::Book, 1).unwrap(), 1);
        assert_eq!(db.approved_comments(ContentType::Quote, 1).unwrap().len(), 1);
    }

    #[test]
    fn filters_moderation_listing() {
        let (db, user) = db_with_user();
        let a = db.add_comment(ContentType::Book, 1, comment(user, "a")).unwrap();
        db.add_comment(ContentType::Book, 1, comment(user, "b")).unwrap();
        db.set_comment_approval(a.id, true).unwrap();

        assert_eq!(db.list_comments(CommentFilter::All).unwrap().len(), 2);
        let pending = db.list_comments(CommentFilter::Pending).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].body, "b");
        assert_eq!(db.list_comments(CommentFilter::Approved).unwrap()[0].id, a.id);
    }

    #[test]
    fn rejects_empty_body_and_unknown_user() {
        let (db, user) = db_with_user();
        assert!(matches!(
            db.add_comment(ContentType::Book, 1, comment(user, "   ")),
            Err(DekError::Validation(_))
        ));
        assert!(matches!(
            db.add_comment(ContentType::Book, 1, comment(user + 100, "hi")),
            Err(DekError::NotFound(_))
        ));
        assert!(db.list_comments(CommentFilter::All).unwrap().is_empty());
    }

    #[test]
    fn delete_and_missing_ids() {
        let (db, user) = db_with_user();
        let c = db.add_comment(ContentType::Book, 1, comment(user, "x")).unwrap();
        db.delete_comment(c.id).unwrap();
        assert!(matches!(db.delete_comment(c.id), Err(DekError::NotFound(_))));
        assert!(matches!(
            db.set_comment_approval(c.id, true),
            Err(DekError::NotFound(_))
        ));
    }
}
