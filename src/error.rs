//! Typed errors: schema/settings problems, client-side API failures, and HTTP mapping for the reference backend.

use crate::field_errors::{ValidationFailure, ValidationItem};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate field '{field}' in resource '{resource}'")]
    DuplicateField { resource: String, field: String },
    #[error("field '{field}' in resource '{resource}' needs at least one choice")]
    MissingChoices { resource: String, field: String },
    #[error("field '{field}' uses reserved name")]
    ReservedName { field: String },
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
    #[error("schema load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Error body as returned by the backend. `detail` is a string, an object with `msg`,
/// or a list of validation items; some proxies answer with a top-level `message` instead.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best single human-readable message carried by the body, if any.
    pub fn summary(&self) -> Option<String> {
        match &self.detail {
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Array(items)) => {
                if let Some(first) = items.first() {
                    if let Some(msg) = first.get("msg").and_then(Value::as_str) {
                        return Some(msg.to_string());
                    }
                    if let Some(loc) = first.get("loc").and_then(Value::as_array) {
                        let joined = loc
                            .iter()
                            .map(|seg| match seg {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(". ");
                        return Some(joined);
                    }
                }
            }
            Some(Value::Object(obj)) => {
                if let Some(msg) = obj.get("msg") {
                    return Some(match msg {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                }
            }
            _ => {}
        }
        self.message.clone()
    }
}

/// Client-side failure of a REST call. Never retried.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("validation failed: {0}")]
    Validation(ValidationFailure),
    #[error("unauthorized")]
    Unauthorized(ErrorBody),
    #[error("request failed with status code {status}")]
    Status { status: u16, body: ErrorBody },
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Validation(_) => Some(422),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Decode(_) => None,
        }
    }
}

/// Errors raised by the reference backend handlers.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{0}")]
    NotFound(String),
    #[error("request validation failed")]
    Validation(Vec<ValidationItem>),
    /// 422 with a plain message, e.g. an unknown timezone.
    #[error("{0}")]
    Unprocessable(String),
    #[error("Could not validate credentials")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = match &self {
            BackendError::NotFound(_) => StatusCode::NOT_FOUND,
            BackendError::Validation(_) | BackendError::Unprocessable(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BackendError::Unauthorized => StatusCode::UNAUTHORIZED,
            BackendError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        let body = match self {
            BackendError::Validation(items) => crate::response::validation_body(&items),
            other => crate::response::detail_body(&other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
