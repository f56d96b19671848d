//! # Domain Model: Collections and Records
//!
//! The catalog is made of **collections** (`books`, `quotes`), each an ordered
//! sequence of **records** persisted as a single JSON array on disk.
//!
//! ## Record Shape
//!
//! Every record carries a mandatory integer `id`, its domain fields, and optional
//! `created_at`/`updated_at` timestamps:
//!
//! ```text
//! Book   { id, title, description, price, image, category, author, pages, format }
//! Quote  { id, text, author, category }
//! ```
//!
//! A load/save cycle writes a document back as it was read: keys the schema does
//! not know about are kept in `extra`, absent fields stay absent, numbers keep
//! their form and timestamps keep their text. A `null` or wrongly typed field
//! reads as missing rather than failing the whole collection.
//!
//! ## Drafts and Patches
//!
//! Writes never take a free-form map. Each record kind has:
//! - a **Draft** (create input): every field optional, missing ones take the
//!   schema default (strings empty, numbers 0, book `format` = `"PDF"`);
//! - a **Patch** (update input): every field optional, missing ones keep the
//!   existing value.
//!
//! Both reject unknown keys at deserialization time, and [`Record::validate_draft`]
//! / [`Record::validate_patch`] check value ranges.
//!
//! ## Timestamps
//!
//! See [`Timestamp`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{DekError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Books,
    Quotes,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Books, Collection::Quotes];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Books => "books",
            Collection::Quotes => "quotes",
        }
    }

    /// Singular form, also used as the `content_type` of comments and ratings.
    pub fn singular(self) -> &'static str {
        match self {
            Collection::Books => "book",
            Collection::Quotes => "quote",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }

    pub fn content_type(self) -> ContentType {
        match self {
            Collection::Books => ContentType::Book,
            Collection::Quotes => ContentType::Quote,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = DekError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "books" => Ok(Collection::Books),
            "quotes" => Ok(Collection::Quotes),
            other => Err(DekError::NotFound(format!("Collection '{}'", other))),
        }
    }
}

/// The kind of content a comment or rating is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Book,
    Quote,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Book => "book",
            ContentType::Quote => "quote",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = DekError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "book" => Ok(ContentType::Book),
            "quote" => Ok(ContentType::Quote),
            other => Err(DekError::Validation(format!("unknown content type '{}'", other))),
        }
    }
}

/// A catalog entry stored in a JSON collection file.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Create input. Missing fields take schema defaults.
    type Draft: DeserializeOwned + fmt::Debug + Send;

    /// Sparse update input. Missing fields keep their current value.
    type Patch: DeserializeOwned + fmt::Debug + Send;

    fn id(&self) -> u64;

    fn from_draft(id: u64, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    fn validate_draft(draft: &Self::Draft) -> Result<()>;

    fn validate_patch(patch: &Self::Patch) -> Result<()>;

    /// Default content written when the collection file does not exist yet.
    fn seed() -> Vec<Self>;
}

// --- Books ---

/// A book as stored in `books.json`.
///
/// Domain fields are optional so a record keeps the shape it had on disk: a key
/// that was absent stays absent when the collection is written back. The
/// accessors return the schema default for a missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kept as the JSON number it was written as, so `10` stays `10`.
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const DEFAULT_FORMAT: &str = "PDF";

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl Book {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn price(&self) -> f64 {
        self.price.as_ref().and_then(Number::as_f64).unwrap_or(0.0)
    }

    pub fn image(&self) -> &str {
        self.image.as_deref().unwrap_or_default()
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }

    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or_default()
    }

    pub fn pages(&self) -> u32 {
        self.pages.unwrap_or(0)
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "zero")]
    pub price: Number,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub pages: i64,
    #[serde(default = "default_format")]
    pub format: String,
}

fn zero() -> Number {
    Number::from(0)
}

impl Default for BookDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            price: zero(),
            image: String::new(),
            category: String::new(),
            author: String::new(),
            pages: 0,
            format: default_format(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Number>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub pages: Option<i64>,
    pub format: Option<String>,
}

fn check_price(price: &Number) -> Result<()> {
    match price.as_f64() {
        Some(value) if value.is_finite() && value >= 0.0 => Ok(()),
        _ => Err(DekError::Validation(
            "price must be a non-negative number".to_string(),
        )),
    }
}

fn check_pages(pages: i64) -> Result<u32> {
    u32::try_from(pages).map_err(|_| {
        DekError::Validation("pages must be a non-negative integer".to_string())
    })
}

impl Record for Book {
    const COLLECTION: Collection = Collection::Books;
    type Draft = BookDraft;
    type Patch = BookPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: BookDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: Some(draft.title),
            description: Some(draft.description),
            price: Some(draft.price),
            image: Some(draft.image),
            category: Some(draft.category),
            author: Some(draft.author),
            pages: Some(check_pages(draft.pages).unwrap_or(0)),
            format: Some(draft.format),
            created_at: Some(now.into()),
            updated_at: None,
            extra: Map::new(),
        }
    }

    fn apply_patch(&mut self, patch: BookPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = Some(title);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        if let Some(image) = patch.image {
            self.image = Some(image);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(author) = patch.author {
            self.author = Some(author);
        }
        if let Some(pages) = patch.pages {
            self.pages = check_pages(pages).ok();
        }
        if let Some(format) = patch.format {
            self.format = Some(format);
        }
        self.updated_at = Some(now.into());
    }

    fn validate_draft(draft: &BookDraft) -> Result<()> {
        check_price(&draft.price)?;
        check_pages(draft.pages).map(drop)
    }

    fn validate_patch(patch: &BookPatch) -> Result<()> {
        if let Some(price) = &patch.price {
            check_price(price)?;
        }
        if let Some(pages) = patch.pages {
            check_pages(pages)?;
        }
        Ok(())
    }

    fn seed() -> Vec<Self> {
        let book = |id: u64,
                    title: &str,
                    description: &str,
                    price: f64,
                    category: &str,
                    pages: u32| Book {
            id,
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            price: Number::from_f64(price),
            image: Some(format!("/static/images/book-{}.jpg", id)),
            category: Some(category.to_string()),
            author: Some("Dek-Dek".to_string()),
            pages: Some(pages),
            format: Some(default_format()),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        };
        vec![
            book(
                1,
                "Les Chemins du Silence",
                "Un recueil de méditations sur la lenteur et l'écoute.",
                9.99,
                "Spiritualité",
                124,
            ),
            book(
                2,
                "Carnet des Petites Joies",
                "Chroniques courtes pour retrouver le goût du quotidien.",
                7.5,
                "Développement personnel",
                96,
            ),
        ]
    }
}

// --- Quotes ---

/// A quote as stored in `quotes.json`. Same shape rules as [`Book`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient::field", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Quote {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or_default()
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuoteDraft {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotePatch {
    pub text: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl Record for Quote {
    const COLLECTION: Collection = Collection::Quotes;
    type Draft = QuoteDraft;
    type Patch = QuotePatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: QuoteDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text: Some(draft.text),
            author: Some(draft.author),
            category: Some(draft.category),
            created_at: Some(now.into()),
            updated_at: None,
            extra: Map::new(),
        }
    }

    fn apply_patch(&mut self, patch: QuotePatch, now: DateTime<Utc>) {
        if let Some(text) = patch.text {
            self.text = Some(text);
        }
        if let Some(author) = patch.author {
            self.author = Some(author);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        self.updated_at = Some(now.into());
    }

    fn validate_draft(_draft: &QuoteDraft) -> Result<()> {
        Ok(())
    }

    fn validate_patch(patch: &QuotePatch) -> Result<()> {
        match &patch.text {
            Some(text) if text.trim().is_empty() => Err(DekError::Validation(
                "quote text cannot be emptied".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn seed() -> Vec<Self> {
        let quote = |id: u64, text: &str, author: &str, category: &str| Quote {
            id,
            text: Some(text.to_string()),
            author: Some(author.to_string()),
            category: Some(category.to_string()),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        };
        vec![
            quote(
                1,
                "La simplicité est la sophistication suprême.",
                "Léonard de Vinci",
                "Sagesse",
            ),
            quote(
                2,
                "Le bonheur n'est pas une destination, c'est une façon de voyager.",
                "Margaret Lee Runbeck",
                "Bonheur",
            ),
            quote(
                3,
                "Ce n'est pas le temps qui manque, c'est nous qui lui manquons.",
                "Paul Claudel",
                "Temps",
            ),
        ]
    }
}

// --- Timestamps ---

/// A record timestamp, kept as the exact text found on disk.
///
/// New timestamps are RFC 3339 in UTC. Older files carry naive ISO-8601 strings
/// (`2024-01-05T10:00:00.123456`), which [`Timestamp::instant`] reads as UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The instant this timestamp denotes, if the text parses.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.0).ok()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339())
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{}'", s))
}

// --- Derived statistics ---

/// Comment and rating summary joined onto a record at read time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatAggregate {
    pub comments_count: u64,
    pub ratings_count: u64,
    pub average_rating: f64,
}

impl StatAggregate {
    /// Builds the aggregate from raw rating values, rounding the mean to one decimal.
    pub fn from_ratings(comments_count: u64, ratings: &[u8]) -> Self {
        let ratings_count = ratings.len() as u64;
        let average_rating = if ratings.is_empty() {
            0.0
        } else {
            let sum: u64 = ratings.iter().map(|r| u64::from(*r)).sum();
            let mean = sum as f64 / ratings.len() as f64;
            (mean * 10.0).round() / 10.0
        };
        Self {
            comments_count,
            ratings_count,
            average_rating,
        }
    }
}

/// A record with its statistics flattened into the same JSON object.
#[derive(Debug, Clone, Serialize)]
pub struct WithStats<R> {
    #[serde(flatten)]
    pub record: R,
    #[serde(flatten)]
    pub stats: StatAggregate,
}

/// Field readers for catalog documents.
///
/// One odd value must not make a whole collection unreadable, so `null` and values
/// of the wrong type read as absent (with a warning) instead of failing the document.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::{Number, Value};
    use tracing::warn;

    pub fn field<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Some(value) = Option::<Value>::deserialize(deserializer)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                warn!(error = %e, "ignoring catalog field of unexpected type");
                Ok(None)
            }
        }
    }

    /// A JSON number, or a string holding one.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None => None,
            Some(Value::Number(n)) => Some(n),
            Some(Value::String(s)) => as_number(&s),
            Some(other) => {
                warn!(value = %other, "ignoring non-numeric catalog field");
                None
            }
        })
    }

    /// A non-negative whole number, as a JSON number or a string.
    pub fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = match Option::<Value>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Value::Number(n)) => Some(n),
            Some(Value::String(s)) => as_number(&s),
            Some(_) => None,
        };
        let count = number.and_then(|n| match n.as_u64() {
            Some(whole) => u32::try_from(whole).ok(),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u32),
        });
        if count.is_none() {
            warn!("ignoring catalog count that is not a non-negative integer");
        }
        Ok(count)
    }

    fn as_number(s: &str) -> Option<Number> {
        let parsed = serde_json::from_str::<Number>(s.trim()).ok();
        if parsed.is_none() {
            warn!(value = s, "ignoring non-numeric catalog field");
        }
        parsed
    }
}
