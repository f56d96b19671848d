//! Admin-only endpoints. The router puts all of them behind
//! [`require_admin`](super::auth::require_admin).

use super::context::AppContext;
use super::envelope::{self, parse_body, parse_id, ApiError, ApiResult};
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use dekdekapp::commands::media::MediaUpload;
use dekdekapp::db::{CommentFilter, MediaPatch, NewUser, UserPatch};
use dekdekapp::error::DekError;
use serde::Deserialize;
use std::sync::Arc;

pub async fn dashboard(State(ctx): State<Arc<AppContext>>) -> ApiResult {
    Ok(envelope::ok(ctx.api.dashboard()?))
}

// --- Users ---

pub async fn list_users(State(ctx): State<Arc<AppContext>>) -> ApiResult {
    Ok(envelope::listed(ctx.api.list_users()?))
}

pub async fn create_user(State(ctx): State<Arc<AppContext>>, body: Bytes) -> ApiResult {
    let new: NewUser = parse_body(&body)?;
    let user = ctx.api.create_user(new)?;
    Ok(envelope::created(user, "user created"))
}

pub async fn update_user(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let id = parse_id(&id, "User")?;
    let patch: UserPatch = parse_body(&body)?;
    Ok(envelope::updated(ctx.api.update_user(id, patch)?, "user updated"))
}

pub async fn delete_user(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, "User")?;
    ctx.api.delete_user(id, &ctx.config.admin_username)?;
    Ok(envelope::message("user deleted"))
}

// --- Comment moderation ---

#[derive(Debug, Default, Deserialize)]
pub struct CommentQuery {
    status: Option<String>,
}

fn comment_filter(status: Option<&str>) -> ApiResult<CommentFilter> {
    match status {
        None | Some("") | Some("all") => Ok(CommentFilter::All),
        Some("pending") => Ok(CommentFilter::Pending),
        Some("approved") => Ok(CommentFilter::Approved),
        Some(other) => Err(DekError::Validation(format!("unknown comment status '{}'", other)).into()),
    }
}

pub async fn list_comments(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<CommentQuery>,
) -> ApiResult {
    let filter = comment_filter(query.status.as_deref())?;
    Ok(envelope::listed(ctx.api.list_comments(filter)?))
}

pub async fn approve_comment(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, "Comment")?;
    Ok(envelope::updated(ctx.api.approve_comment(id)?, "comment approved"))
}

pub async fn reject_comment(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, "Comment")?;
    Ok(envelope::updated(ctx.api.reject_comment(id)?, "comment rejected"))
}

pub async fn delete_comment(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, "Comment")?;
    ctx.api.delete_comment(id)?;
    Ok(envelope::message("comment deleted"))
}

// --- Media ---

pub async fn list_media(State(ctx): State<Arc<AppContext>>) -> ApiResult {
    Ok(envelope::listed(ctx.api.list_media()?))
}

/// Multipart fields: `file` (required), `title`, `description`, `is_featured` ("true").
pub async fn upload_media(
    State(ctx): State<Arc<AppContext>>,
    mut multipart: Multipart,
) -> ApiResult {
    let mut upload = MediaUpload::default();
    let mut has_file = false;

    while let Some(field) = multipart.next_field().await.map_err(ApiError::from)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.original_name = field.file_name().unwrap_or_default().to_string();
                upload.bytes = field.bytes().await?.to_vec();
                has_file = true;
            }
            "title" => upload.title = field.text().await?,
            "description" => upload.description = field.text().await?,
            "is_featured" => upload.is_featured = field.text().await? == "true",
            _ => {}
        }
    }
    if !has_file {
        return Err(DekError::Validation("no file selected".to_string()).into());
    }

    let media = ctx.api.upload_media(upload)?;
    Ok(envelope::created(media, "file uploaded"))
}

pub async fn update_media(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let id = parse_id(&id, "Media")?;
    let patch: MediaPatch = parse_body(&body)?;
    Ok(envelope::updated(ctx.api.update_media(id, patch)?, "media updated"))
}

pub async fn delete_media(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, "Media")?;
    ctx.api.delete_media(id)?;
    Ok(envelope::message("media deleted"))
}
