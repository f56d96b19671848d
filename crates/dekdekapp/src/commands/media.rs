use crate::db::{Database, Media, MediaKind, NewMedia};
use crate::error::{DekError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: [&str; 10] = [
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "mp4", "avi", "mov", "webm",
];

/// A file received from an admin, not yet on disk.
#[derive(Debug, Clone, Default)]
pub struct MediaUpload {
    pub original_name: String,
    pub bytes: Vec<u8>,
    pub title: String,
    pub description: String,
    pub is_featured: bool,
}

pub fn classify(extension: &str) -> MediaKind {
    match extension {
        "jpg" | "jpeg" | "png" | "gif" => MediaKind::Image,
        "mp4" | "avi" | "mov" | "webm" => MediaKind::Video,
        _ => MediaKind::Document,
    }
}

/// Reduces a client-supplied file name to a safe basename of ASCII letters,
/// digits, `.`, `-` and `_`. Whitespace becomes `_`; leading dots are dropped.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// Lowercased extension of a sanitized name, if it is one we accept.
fn allowed_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Writes the file under `upload_dir/<subfolder>/<uuid>.<ext>` and records it.
pub fn upload(db: &Database, upload_dir: &Path, upload: MediaUpload) -> Result<Media> {
    if upload.original_name.trim().is_empty() {
        return Err(DekError::Validation("no file selected".to_string()));
    }
    let original_filename = sanitize_filename(&upload.original_name);
    let extension = allowed_extension(&original_filename)
        .ok_or_else(|| DekError::Validation("file type not allowed".to_string()))?;

    let kind = classify(&extension);
    let filename = format!("{}.{}", Uuid::new_v4().simple(), extension);
    let folder = upload_dir.join(kind.subfolder());
    fs::create_dir_all(&folder)?;
    let path = folder.join(&filename);
    fs::write(&path, &upload.bytes)?;

    let inserted = db.insert_media(NewMedia {
        filename,
        original_filename,
        file_type: kind,
        file_path: path.display().to_string(),
        file_size: upload.bytes.len() as u64,
        title: upload.title,
        description: upload.description,
        is_featured: upload.is_featured,
    });
    if inserted.is_err() {
        let _ = fs::remove_file(&path);
    }
    inserted
}

/// Deletes the record and its file. A file already gone is not an error.
pub fn remove(db: &Database, upload_dir: &Path, id: i64) -> Result<Media> {
    let media = db.delete_media(id)?;
    let path = upload_dir.join(media.file_type.subfolder()).join(&media.filename);
    match fs::remove_file(&path) {
        Ok(()) => info!(id, path = %path.display(), "media file removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(id, path = %path.display(), error = %e, "could not remove media file"),
    }
    Ok(media)
}
