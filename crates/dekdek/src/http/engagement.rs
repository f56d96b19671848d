//! Public endpoints around the catalog: users, comments, ratings, stats, featured media.

use super::catalog::{parse_collection, with_record_type};
use super::context::AppContext;
use super::envelope::{self, parse_body, parse_id, ApiResult};
use axum::body::Bytes;
use axum::extract::{Path, State};
use dekdekapp::db::{NewComment, NewRating, NewUser};
use dekdekapp::model::Record;
use std::sync::Arc;

fn comments_on<R: Record>(ctx: &AppContext, id: u64) -> ApiResult {
    Ok(envelope::listed(ctx.api.comments::<R>(id)?))
}

fn comment_on<R: Record>(ctx: &AppContext, id: u64, body: &[u8]) -> ApiResult {
    let new: NewComment = parse_body(body)?;
    let comment = ctx.api.add_comment::<R>(id, new)?;
    Ok(envelope::created(comment, "comment submitted for moderation"))
}

fn rate<R: Record>(ctx: &AppContext, id: u64, body: &[u8]) -> ApiResult {
    let new: NewRating = parse_body(body)?;
    let rating = ctx.api.rate::<R>(id, new)?;
    Ok(envelope::created(rating, "rating recorded"))
}

pub async fn list_comments(
    State(ctx): State<Arc<AppContext>>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id, collection.singular())?;
    with_record_type!(collection, R => comments_on::<R>(&ctx, id))
}

pub async fn add_comment(
    State(ctx): State<Arc<AppContext>>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id, collection.singular())?;
    with_record_type!(collection, R => comment_on::<R>(&ctx, id, &body))
}

pub async fn add_rating(
    State(ctx): State<Arc<AppContext>>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id, collection.singular())?;
    with_record_type!(collection, R => rate::<R>(&ctx, id, &body))
}

pub async fn stats(
    State(ctx): State<Arc<AppContext>>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id, collection.singular())?;
    Ok(with_record_type!(collection, R => envelope::ok(ctx.api.stats::<R>(id)?)))
}

pub async fn register(State(ctx): State<Arc<AppContext>>, body: Bytes) -> ApiResult {
    let mut new: NewUser = parse_body(&body)?;
    // Admin rights are only granted through the admin API.
    new.is_admin = false;
    let user = ctx.api.create_user(new)?;
    Ok(envelope::created(user, "user created"))
}

pub async fn get_user(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, "User")?;
    Ok(envelope::ok(ctx.api.get_user(id)?))
}

pub async fn featured_media(State(ctx): State<Arc<AppContext>>) -> ApiResult {
    Ok(envelope::listed(ctx.api.featured_media()?))
}
