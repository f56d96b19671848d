//! The JSON envelope every endpoint answers with, and the error type handlers return.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dekdekapp::error::DekError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use tracing::error;

/// `{success, data?, error?, count?, message?}`
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            count: None,
            message: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            count: None,
            message: Some(message.into()),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            count: None,
            message: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub fn ok<T: Serialize>(data: T) -> Response {
    Envelope::data(data).into_response()
}

pub fn listed<T: Serialize>(items: Vec<T>) -> Response {
    let count = items.len();
    Envelope::data(items).with_count(count).into_response()
}

pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    (
        StatusCode::CREATED,
        Envelope::data(data).with_message(message),
    )
        .into_response()
}

pub fn updated<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    Envelope::data(data).with_message(message).into_response()
}

pub fn message(message: impl Into<String>) -> Response {
    Envelope::message(message).into_response()
}

/// A failed request: a status code and the text put in the envelope's `error`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DekError> for ApiError {
    fn from(err: DekError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Envelope::failure(self.message)).into_response()
    }
}

pub type ApiResult<T = Response> = Result<T, ApiError>;

/// Parses a JSON request body; any syntax, type or unknown-field problem is a 400.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| DekError::Validation(format!("invalid JSON body: {}", e)).into())
}

/// Parses an id taken from the path. Anything that is not an id cannot name an
/// existing entity, so it is reported as not found.
pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> ApiResult<T> {
    raw.parse()
        .map_err(|_| DekError::NotFound(format!("{} {}", what, raw)).into())
}
