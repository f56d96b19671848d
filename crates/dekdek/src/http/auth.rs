//! Admin sessions: login issues a bearer token, the gate checks it.

use super::context::AppContext;
use super::envelope::{self, parse_body, ApiError, ApiResult, Envelope};
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dekdekapp::error::DekError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn login(State(ctx): State<Arc<AppContext>>, body: Bytes) -> ApiResult {
    let credentials: Credentials = parse_body(&body)?;
    match ctx.login(&credentials.username, &credentials.password) {
        Some(token) => {
            info!(username = %credentials.username, "admin logged in");
            Ok(Envelope::data(Session {
                token,
                username: credentials.username,
            })
            .with_message("logged in")
            .into_response())
        }
        None => {
            warn!(username = %credentials.username, "rejected admin login");
            Err(DekError::Unauthorized.into())
        }
    }
}

pub async fn logout(State(ctx): State<Arc<AppContext>>, headers: HeaderMap) -> Response {
    if let Some(token) = bearer_token(&headers) {
        ctx.logout(token);
    }
    envelope::message("logged out")
}

/// Lets the request through only with the token of an open admin session.
pub async fn require_admin(
    State(ctx): State<Arc<AppContext>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = bearer_token(request.headers()).is_some_and(|t| ctx.is_admin_session(t));
    if !authorized {
        return ApiError::from(DekError::Unauthorized).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_tokens_only() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
