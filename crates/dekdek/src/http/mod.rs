//! # HTTP Layer
//!
//! Maps verbs and paths onto the [`DekApi`](dekdekapp::api::DekApi) facade and
//! renders every answer as a JSON [`Envelope`](envelope::Envelope).
//!
//! ## Routes
//!
//! Public:
//! - `GET /health`
//! - `GET /api/:collection[?stats=true]`, `GET /api/:collection/:id[?stats=true]`,
//!   `GET /api/:collection/random`
//! - `GET|POST /api/:collection/:id/comments`, `POST /api/:collection/:id/ratings`,
//!   `GET /api/:collection/:id/stats`
//! - `POST /api/users`, `GET /api/users/:id`, `GET /api/featured-media`
//! - `POST /api/admin/login`, `POST /api/admin/logout`
//!
//! Admin (`Authorization: Bearer <token>` from login):
//! - `POST /api/admin/:collection`, `PUT|DELETE /api/admin/:collection/:id`
//! - `GET /api/admin/stats`
//! - `GET|POST /api/admin/users`, `PUT|DELETE /api/admin/users/:id`
//! - `GET /api/admin/comments[?status=pending|approved]`,
//!   `POST /api/admin/comments/:id/approve|reject`, `DELETE /api/admin/comments/:id`
//! - `GET /api/admin/media`, `POST /api/admin/media/upload`,
//!   `PUT|DELETE /api/admin/media/:id`
//!
//! `:collection` is `books` or `quotes`; anything else is a 404.
//!
//! ## Blocking Calls
//!
//! Store and database calls are synchronous and short. Handlers call them directly
//! instead of moving them to a blocking pool.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod context;
pub mod engagement;
pub mod envelope;

pub use context::AppContext;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(ctx: Arc<AppContext>) -> Router {
    let body_limit = usize::try_from(ctx.config.max_upload_bytes).unwrap_or(usize::MAX);

    let admin_routes = Router::new()
        .route("/api/admin/stats", get(admin::dashboard))
        .route(
            "/api/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route(
            "/api/admin/users/:id",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/api/admin/comments", get(admin::list_comments))
        .route(
            "/api/admin/comments/:id",
            axum::routing::delete(admin::delete_comment),
        )
        .route(
            "/api/admin/comments/:id/approve",
            post(admin::approve_comment),
        )
        .route("/api/admin/comments/:id/reject", post(admin::reject_comment))
        .route("/api/admin/media", get(admin::list_media))
        .route("/api/admin/media/upload", post(admin::upload_media))
        .route(
            "/api/admin/media/:id",
            put(admin::update_media).delete(admin::delete_media),
        )
        .route("/api/admin/:collection", post(catalog::create))
        .route(
            "/api/admin/:collection/:id",
            put(catalog::update).delete(catalog::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/api/featured-media", get(engagement::featured_media))
        .route("/api/users", post(engagement::register))
        .route("/api/users/:id", get(engagement::get_user))
        .route("/api/admin/login", post(auth::login))
        .route("/api/admin/logout", post(auth::logout))
        .route("/api/:collection", get(catalog::list))
        .route("/api/:collection/random", get(catalog::random))
        .route("/api/:collection/:id", get(catalog::get_one))
        .route(
            "/api/:collection/:id/comments",
            get(engagement::list_comments).post(engagement::add_comment),
        )
        .route("/api/:collection/:id/ratings", post(engagement::add_rating))
        .route("/api/:collection/:id/stats", get(engagement::stats))
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

async fn health() -> Response {
    envelope::ok(json!({
        "status": "OK",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serves until Ctrl-C.
pub async fn serve(ctx: Arc<AppContext>, listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        // Without a signal handler the server simply runs until killed.
        Err(_) => std::future::pending::<()>().await,
    }
}
