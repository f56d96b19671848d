//! Catalog endpoints. The collection comes from the path and picks the record type.

use super::context::AppContext;
use super::envelope::{self, parse_body, parse_id, ApiResult};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use dekdekapp::model::{Collection, Record};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    stats: Option<String>,
}

impl StatsQuery {
    fn wanted(&self) -> bool {
        self.stats.as_deref() == Some("true")
    }
}

pub(crate) fn parse_collection(raw: &str) -> ApiResult<Collection> {
    Ok(raw.parse::<Collection>()?)
}

/// Runs `$body` with `$r` bound to the record type of `$collection`.
macro_rules! with_record_type {
    ($collection:expr, $r:ident => $body:expr) => {
        match $collection {
            ::dekdekapp::model::Collection::Books => {
                type $r = ::dekdekapp::model::Book;
                $body
            }
            ::dekdekapp::model::Collection::Quotes => {
                type $r = ::dekdekapp::model::Quote;
                $body
            }
        }
    };
}
pub(crate) use with_record_type;

fn list_of<R: Record>(ctx: &AppContext, with_stats: bool) -> Response {
    if with_stats {
        envelope::listed(ctx.api.list_with_stats::<R>())
    } else {
        envelope::listed(ctx.api.list::<R>())
    }
}

fn one_of<R: Record>(ctx: &AppContext, id: u64, with_stats: bool) -> ApiResult {
    Ok(if with_stats {
        envelope::ok(ctx.api.get_with_stats::<R>(id)?)
    } else {
        envelope::ok(ctx.api.get::<R>(id)?)
    })
}

fn create_in<R: Record>(ctx: &AppContext, body: &[u8]) -> ApiResult {
    let draft: R::Draft = parse_body(body)?;
    let record = ctx.api.create::<R>(draft)?;
    let message = format!("{} {} created", R::COLLECTION.singular(), record.id());
    Ok(envelope::created(record, message))
}

fn update_in<R: Record>(ctx: &AppContext, id: u64, body: &[u8]) -> ApiResult {
    let patch: R::Patch = parse_body(body)?;
    let record = ctx.api.update::<R>(id, patch)?;
    Ok(envelope::updated(
        record,
        format!("{} {} updated", R::COLLECTION.singular(), id),
    ))
}

fn delete_in<R: Record>(ctx: &AppContext, id: u64) -> ApiResult {
    ctx.api.delete::<R>(id)?;
    Ok(envelope::message(format!(
        "{} {} deleted",
        R::COLLECTION.singular(),
        id
    )))
}

pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Path(collection): Path<String>,
    Query(query): Query<StatsQuery>,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    Ok(with_record_type!(collection, R => list_of::<R>(&ctx, query.wanted())))
}

pub async fn get_one(
    State(ctx): State<Arc<AppContext>>,
    Path((collection, id)): Path<(String, String)>,
    Query(query): Query<StatsQuery>,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id, collection.singular())?;
    with_record_type!(collection, R => one_of::<R>(&ctx, id, query.wanted()))
}

pub async fn random(
    State(ctx): State<Arc<AppContext>>,
    Path(collection): Path<String>,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    Ok(with_record_type!(collection, R => envelope::ok(ctx.api.random::<R>()?)))
}

pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Path(collection): Path<String>,
    body: Bytes,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    with_record_type!(collection, R => create_in::<R>(&ctx, &body))
}

pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id, collection.singular())?;
    with_record_type!(collection, R => update_in::<R>(&ctx, id, &body))
}

pub async fn delete(
    State(ctx): State<Arc<AppContext>>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult {
    let collection = parse_collection(&collection)?;
    let id = parse_id(&id, collection.singular())?;
    with_record_type!(collection, R => delete_in::<R>(&ctx, id))
}
