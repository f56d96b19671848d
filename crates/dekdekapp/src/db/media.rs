use super::Database;
use crate::error::{DekError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Broad kind of an uploaded file, which also decides its subfolder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }

    /// Directory under the upload root holding files of this kind.
    pub fn subfolder(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
            MediaKind::Document => "books",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = DekError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "document" => Ok(MediaKind::Document),
            other => Err(DekError::Validation(format!("unknown media type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Media {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_type: MediaKind,
    pub file_path: String,
    pub file_size: u64,
    pub title: String,
    pub description: String,
    pub is_featured: bool,
    pub uploaded_at: DateTime<Utc>,
    /// Public path the file is served from.
    pub url: String,
}

/// Row to insert once the file itself has been written.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub filename: String,
    pub original_filename: String,
    pub file_type: MediaKind,
    pub file_path: String,
    pub file_size: u64,
    pub title: String,
    pub description: String,
    pub is_featured: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_featured: Option<bool>,
}

const MEDIA_COLUMNS: &str = "id, filename, original_filename, file_type, file_path, file_size, \
     title, description, is_featured, uploaded_at";

fn media_from_row(row: &Row<'_>) -> rusqlite::Result<Media> {
    let kind: String = row.get(3)?;
    let file_type = MediaKind::from_str(&kind).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let filename: String = row.get(1)?;
    let file_size: i64 = row.get(5)?;
    Ok(Media {
        id: row.get(0)?,
        url: format!("/uploads/{}/{}", file_type.subfolder(), filename),
        filename,
        original_filename: row.get(2)?,
        file_type,
        file_path: row.get(4)?,
        file_size: file_size as u64,
        title: row.get(6)?,
        description: row.get(7)?,
        is_featured: row.get(8)?,
        uploaded_at: row.get(9)?,
    })
}

impl Database {
    pub fn insert_media(&self, new: NewMedia) -> Result<Media> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO media (filename, original_filename, file_type, file_path, file_size,
                                title, description, is_featured, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new.filename,
                new.original_filename,
                new.file_type.as_str(),
                new.file_path,
                new.file_size as i64,
                new.title,
                new.description,
                new.is_featured,
                Utc::now()
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        info!(id, filename = %new.filename, kind = %new.file_type, "media stored");
        self.get_media(id)
    }

    pub fn get_media(&self, id: i64) -> Result<Media> {
        self.conn()
            .query_row(
                &format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = ?1"),
                [id],
                media_from_row,
            )
            .optional()?
            .ok_or_else(|| DekError::NotFound(format!("Media {}", id)))
    }

    /// Newest first.
    pub fn list_media(&self) -> Result<Vec<Media>> {
        self.query_media("")
    }

    /// Featured media for the home page, newest first.
    pub fn featured_media(&self) -> Result<Vec<Media>> {
        self.query_media(" WHERE is_featured = 1")
    }

    fn query_media(&self, clause: &str) -> Result<Vec<Media>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media{clause} ORDER BY uploaded_at DESC, id DESC"
        ))?;
        let media = stmt
            .query_map([], media_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(media)
    }

    pub fn update_media(&self, id: i64, patch: MediaPatch) -> Result<Media> {
        let current = self.get_media(id)?;
        self.conn().execute(
            "UPDATE media SET title = ?1, description = ?2, is_featured = ?3 WHERE id = ?4",
            params![
                patch.title.unwrap_or(current.title),
                patch.description.unwrap_or(current.description),
                patch.is_featured.unwrap_or(current.is_featured),
                id
            ],
        )?;
        self.get_media(id)
    }

    /// Removes the row and returns it, so the caller can delete the file.
    pub fn delete_media(&self, id: i64) -> Result<Media> {
        let media = self.get_media(id)?;
        self.conn().execute("DELETE FROM media WHERE id = ?1", [id])?;
        Ok(media)
    }

    /// `(total, featured)`
    pub fn count_media(&self) -> Result<(u64, u64)> {
        let (total, featured): (i64, i64) = self.conn().query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_featured), 0) FROM media",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((total as u64, featured as u64))
    }
}
