use super::Database;
use crate::error::{DekError, Result};
use crate::model::ContentType;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub content_type: ContentType,
    pub content_id: u64,
    pub value: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRating {
    pub user_id: i64,
    pub value: i64,
}

impl Database {
    /// Records a user's rating of an item, replacing any earlier rating they gave it.
    pub fn rate(&self, content_type: ContentType, content_id: u64, new: NewRating) -> Result<Rating> {
        if !(1..=5).contains(&new.value) {
            return Err(DekError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        let value = new.value as u8;

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
            "INSERT INTO ratings (user_id, content_type, content_id, value, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id, content_type, content_id)
             DO UPDATE SET value = excluded.value, created_at = excluded.created_at",
            params![
                new.user_id,
                content_type.as_str(),
                content_id as i64,
                value,
                Utc::now()
            ],
        )?;
        let (id, created_at): (i64, DateTime<Utc>) = tx.query_row(
            "SELECT id, created_at FROM ratings
             WHERE user_id = ?1 AND content_type = ?2 AND content_id = ?3",
            params![new.user_id, content_type.as_str(), content_id as i64],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        tx.commit()?;

        Ok(Rating {
            id,
            user_id: new.user_id,
            content_type,
            content_id,
            value,
            created_at,
        })
    }

    pub fn rating_values(&self, content_type: ContentType, content_id: u64) -> Result<Vec<u8>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT value FROM ratings WHERE content_type = ?1 AND content_id = ?2 ORDER BY id",
        )?;
        let values = stmt
            .query_map(params![content_type.as_str(), content_id as i64], |row| {
                row.get::<_, u8>(0)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;

    fn db_with_users(n: usize) -> (Database, Vec<i64>) {
        let db = Database::open_in_memory().unwrap();
        let ids = (0..n)
            .map(|i| {
                db.create_user(NewUser {
                    username: format!("user{}", i),
                    email: format!("user{}@example.com", i),
                    is_admin: false,
                })
                .unwrap()
                .id
            })
            .collect();
        (db, ids)
    }

    #[test]
    fn collects_values_per_item() {
        let (db, users) = db_with_users(3);
        for (user, value) in users.iter().zip([3, 4, 5]) {
            db.rate(ContentType::Book, 1, NewRating { user_id: *user, value })
                .unwrap();
        }
        db.rate(ContentType::Quote, 1, NewRating { user_id: users[0], value: 1 })
            .unwrap();
        assert_eq!(db.rating_values(ContentType::Book, 1).unwrap(), vec![3, 4, 5]);
        assert_eq!(db.rating_values(ContentType::Quote, 1).unwrap(), vec![1]);
        assert!(db.rating_values(ContentType::Book, 2).unwrap().is_empty());
    }

    #[test]
    fn rating_again_replaces_previous_value() {
        let (db, users) = db_with_users(1);
        let first = db
            .rate(ContentType::Book, 1, NewRating { user_id: users[0], value: 2 })
            .unwrap();
        let second = db
            .rate(ContentType::Book, 1, NewRating { user_id: users[0], value: 5 })
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.value, 5);
        assert_eq!(db.rating_values(ContentType::Book, 1).unwrap(), vec![5]);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let (db, users) = db_with_users(1);
        for value in [0, 6, -1] {
            let err = db
                .rate(ContentType::Book, 1, NewRating { user_id: users[0], value })
                .unwrap_err();
            assert!(matches!(err, DekError::Validation(_)));
        }
    }

    #[test]
    fn unknown_user_is_not_found() {
        let (db, _) = db_with_users(0);
        let err = db
            .rate(ContentType::Book, 1, NewRating { user_id: 77, value: 3 })
            .unwrap_err();
        assert!(matches!(err, DekError::NotFound(_)));
    }
}
