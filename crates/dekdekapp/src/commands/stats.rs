use crate::db::Database;
use crate::error::Result;
use crate::model::{Book, ContentType, Quote, Record, StatAggregate, WithStats};
use crate::store::backend::StorageBackend;
use crate::store::RecordStore;
use serde::Serialize;
use tracing::warn;

/// Where comment and rating figures come from.
pub trait StatsSource {
    fn rating_values(&self, content_type: ContentType, content_id: u64) -> Result<Vec<u8>>;
    fn approved_comment_count(&self, content_type: ContentType, content_id: u64) -> Result<u64>;
}

impl StatsSource for Database {
    fn rating_values(&self, content_type: ContentType, content_id: u64) -> Result<Vec<u8>> {
        Database::rating_values(self, content_type, content_id)
    }

    fn approved_comment_count(&self, content_type: ContentType, content_id: u64) -> Result<u64> {
        Database::approved_comment_count(self, content_type, content_id)
    }
}

/// Aggregate for one item. Source failures are logged and yield zeros.
pub fn stats_for<S: StatsSource + ?Sized>(
    source: &S,
    content_type: ContentType,
    content_id: u64,
) -> StatAggregate {
    let gathered = source
        .approved_comment_count(content_type, content_id)
        .and_then(|comments| {
            let ratings = source.rating_values(content_type, content_id)?;
            Ok(StatAggregate::from_ratings(comments, &ratings))
        });
    match gathered {
        Ok(stats) => stats,
        Err(e) => {
            warn!(%content_type, content_id, error = %e, "stats unavailable, reporting zeros");
            StatAggregate::default()
        }
    }
}

pub fn attach_stats<R: Record, S: StatsSource + ?Sized>(
    records: Vec<R>,
    source: &S,
) -> Vec<WithStats<R>> {
    let content_type = R::COLLECTION.content_type();
    records
        .into_iter()
        .map(|record| {
            let stats = stats_for(source, content_type, record.id());
            WithStats { record, stats }
        })
        .collect()
}

/// Site-wide totals for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub admin_users: u64,
    pub regular_users: u64,
    pub total_books: u64,
    pub total_quotes: u64,
    pub total_media: u64,
    pub featured_media: u64,
    pub pending_comments: u64,
}

pub fn dashboard<B: StorageBackend>(store: &RecordStore<B>, db: &Database) -> Result<DashboardStats> {
    let (total_users, admin_users) = db.count_users()?;
    let (total_media, featured_media) = db.count_media()?;
    let books: Vec<Book> = store.load();
    let quotes: Vec<Quote> = store.load();
    Ok(DashboardStats {
        total_users,
        admin_users,
        regular_users: total_users.saturating_sub(admin_users),
        total_books: books.len() as u64,
        total_quotes: quotes.len() as u64,
        total_media,
        featured_media,
        pending_comments: db.pending_comment_count()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewComment, NewRating, NewUser};
    use crate::error::DekError;
    use crate::store::memory::fixtures::StoreFixture;

    struct BrokenSource;

    impl StatsSource for BrokenSource {
        fn rating_values(&self, _: ContentType, _: u64) -> Result<Vec<u8>> {
            Err(DekError::Store("ratings offline".into()))
        }

        fn approved_comment_count(&self, _: ContentType, _: u64) -> Result<u64> {
            Ok(3)
        }
    }

    fn db_with_users(n: usize) -> (Database, Vec<i64>) {
        let db = Database::open_in_memory().unwrap();
        let ids = (0..n)
            .map(|i| {
                db.create_user(NewUser {
                    username: format!("u{}", i),
                    email: format!("u{}@example.com", i),
                    is_admin: false,
                })
                .unwrap()
                .id
            })
            .collect();
        (db, ids)
    }

    #[test]
    fn failing_source_yields_zeroed_aggregate() {
        let stats = stats_for(&BrokenSource, ContentType::Book, 1);
        assert_eq!(stats, StatAggregate::default());
    }

    #[test]
    fn counts_only_approved_comments_and_rounds_average() {
        let (db, users) = db_with_users(3);
        let approved = db
            .add_comment(
                ContentType::Book,
                1,
                NewComment {
                    user_id: users[0],
                    body: "bien".into(),
                },
            )
            .unwrap();
        db.set_comment_approval(approved.id, true).unwrap();
        db.add_comment(
            ContentType::Book,
            1,
            NewComment {
                user_id: users[1],
                body: "en attente".into(),
            },
        )
        .unwrap();
        for (user, value) in users.iter().zip([4, 5, 5]) {
            db.rate(ContentType::Book, 1, NewRating { user_id: *user, value })
                .unwrap();
        }

        let stats = stats_for(&db, ContentType::Book, 1);
        assert_eq!(stats.comments_count, 1);
        assert_eq!(stats.ratings_count, 3);
        assert_eq!(stats.average_rating, 4.7);
    }

    #[test]
    fn attach_stats_flattens_into_each_record() {
        let (db, users) = db_with_users(1);
        db.rate(ContentType::Quote, 2, NewRating { user_id: users[0], value: 2 })
            .unwrap();
        let fixture = StoreFixture::new().with_quotes(&["a", "b"]);
        let quotes: Vec<Quote> = fixture.store.load();

        let enriched = attach_stats(quotes, &db);
        assert_eq!(enriched[0].stats, StatAggregate::default());
        let json = serde_json::to_value(&enriched[1]).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["text"], "b");
        assert_eq!(json["ratings_count"], 1);
        assert_eq!(json["average_rating"], 2.0);
    }

    #[test]
    fn dashboard_totals() {
        let (db, _) = db_with_users(2);
        db.ensure_admin("admin", "admin@dek-dek.com").unwrap();
        let fixture = StoreFixture::unseeded();

        let stats = dashboard(&fixture.store, &db).unwrap();
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.admin_users, 1);
        assert_eq!(stats.regular_users, 2);
        assert_eq!(stats.total_books, 2);
        assert_eq!(stats.total_quotes, 3);
        assert_eq!(stats.total_media, 0);
        assert_eq!(stats.pending_comments, 0);
    }
}
