use super::{conflict_or_db, Database};
use crate::error::{DekError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

const USER_COLUMNS: &str = "id, username, email, is_admin, created_at";
const DUPLICATE_USER: &str = "username or email already exists";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        is_admin: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn clean_username(raw: &str) -> Result<String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(DekError::Validation("username is required".to_string()));
    }
    Ok(username.to_string())
}

fn clean_email(raw: &str) -> Result<String> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(DekError::Validation("email is required".to_string()));
    }
    if !email.contains('@') {
        return Err(DekError::Validation(format!("'{}' is not an email address", email)));
    }
    Ok(email.to_string())
}

impl Database {
    pub fn create_user(&self, new: NewUser) -> Result<User> {
        let username = clean_username(&new.username)?;
        let email = clean_email(&new.email)?;

        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (username, email, is_admin, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![username, email, new.is_admin, Utc::now()],
        )
        .map_err(|e| conflict_or_db(e, DUPLICATE_USER))?;
        let id = conn.last_insert_rowid();
        drop(conn);

        info!(id, %username, "user created");
        self.get_user(id)
    }

    pub fn get_user(&self, id: i64) -> Result<User> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                user_from_row,
            )
            .optional()?
            .ok_or_else(|| DekError::NotFound(format!("User {}", id)))
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                [username],
                user_from_row,
            )
            .optional()?)
    }

    /// Newest first.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    pub fn update_user(&self, id: i64, patch: UserPatch) -> Result<User> {
        let current = self.get_user(id)?;
        let username = match patch.username {
            Some(raw) => clean_username(&raw)?,
            None => current.username,
        };
        let email = match patch.email {
            Some(raw) => clean_email(&raw)?,
            None => current.email,
        };
        let is_admin = patch.is_admin.unwrap_or(current.is_admin);

        self.conn()
            .execute(
                "UPDATE users SET username = ?1, email = ?2, is_admin = ?3 WHERE id = ?4",
                params![username, email, is_admin, id],
            )
            .map_err(|e| conflict_or_db(e, DUPLICATE_USER))?;
        self.get_user(id)
    }

    /// Deletes a user along with their comments and ratings.
    /// The account named `protected_username` cannot be deleted.
    pub fn delete_user(&self, id: i64, protected_username: &str) -> Result<()> {
        let user = self.get_user(id)?;
        if user.username == protected_username {
            return Err(DekError::Forbidden(
                "the primary administrator cannot be deleted".to_string(),
            ));
        }

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM comments WHERE user_id = ?1", [id])?;
        tx.execute("DELETE FROM ratings WHERE user_id = ?1", [id])?;
        tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
        tx.commit()?;

        info!(id, username = %user.username, "user deleted");
        Ok(())
    }

    /// Creates the administrator account if no user has that name yet.
    pub fn ensure_admin(&self, username: &str, email: &str) -> Result<User> {
        if let Some(existing) = self.find_user_by_username(username)? {
            return Ok(existing);
        }
        info!(%username, "creating administrator account");
        self.create_user(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            is_admin: true,
        })
    }

    /// `(total, admins)`
    pub fn count_users(&self) -> Result<(u64, u64)> {
        let conn = self.conn();
        let (total, admins): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_admin), 0) FROM users",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((total as u64, admins as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            is_admin: false,
        }
    }

    #[test]
    fn create_and_fetch() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user(new_user("  lea ")).unwrap();
        assert_eq!(user.username, "lea");
        assert!(!user.is_admin);
        assert_eq!(db.get_user(user.id).unwrap(), user);
    }

    #[test]
    fn duplicate_username_or_email_conflicts() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(new_user("lea")).unwrap();

        let err = db.create_user(new_user("lea")).unwrap_err();
        assert!(matches!(err, DekError::Conflict(_)));

        let err = db
            .create_user(NewUser {
                username: "other".into(),
                email: "lea@example.com".into(),
                is_admin: false,
            })
            .unwrap_err();
        assert!(matches!(err, DekError::Conflict(_)));
    }

    #[test]
    fn rejects_blank_username_and_bad_email() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .create_user(NewUser {
                username: " ".into(),
                email: "a@b.c".into(),
                is_admin: false,
            })
            .unwrap_err();
        assert!(matches!(err, DekError::Validation(_)));
        let err = db
            .create_user(NewUser {
                username: "a".into(),
                email: "nope".into(),
                is_admin: false,
            })
            .unwrap_err();
        assert!(matches!(err, DekError::Validation(_)));
    }

    #[test]
    fn update_is_sparse_and_detects_conflicts() {
        let db = Database::open_in_memory().unwrap();
        let lea = db.create_user(new_user("lea")).unwrap();
        db.create_user(new_user("tom")).unwrap();

        let updated = db
            .update_user(
                lea.id,
                UserPatch {
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.is_admin);
        assert_eq!(updated.username, "lea");
        assert_eq!(updated.email, lea.email);

        let err = db
            .update_user(
                lea.id,
                UserPatch {
                    username: Some("tom".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DekError::Conflict(_)));
    }

    #[test]
    fn primary_admin_cannot_be_deleted() {
        let db = Database::open_in_memory().unwrap();
        let admin = db.ensure_admin("admin", "admin@dek-dek.com").unwrap();
        let err = db.delete_user(admin.id, "admin").unwrap_err();
        assert!(matches!(err, DekError::Forbidden(_)));

        let lea = db.create_user(new_user("lea")).unwrap();
        db.delete_user(lea.id, "admin").unwrap();
        assert!(matches!(db.get_user(lea.id), Err(DekError::NotFound(_))));
    }

    #[test]
    fn ensure_admin_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let first = db.ensure_admin("admin", "admin@dek-dek.com").unwrap();
        let second = db.ensure_admin("admin", "admin@dek-dek.com").unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.is_admin);
        assert_eq!(db.count_users().unwrap(), (1, 1));
    }

    #[test]
    fn missing_user_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.get_user(5), Err(DekError::NotFound(_))));
        assert!(matches!(
            db.update_user(5, UserPatch::default()),
            Err(DekError::NotFound(_))
        ));
        assert!(matches!(
            db.delete_user(5, "admin"),
            Err(DekError::NotFound(_))
        ));
    }
}
