use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use sweetshop_auth::{AuthError, AuthzError};
use sweetshop_core::{ValidationError, ValidationErrors};
use sweetshop_inventory::InventoryError;

/// Every failure a handler can return, mapped to a status and JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Body could not be parsed as the expected JSON shape.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error("{0}")]
    UsernameTaken(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    InvalidToken(String),

    #[error("{0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<InventoryError> for ApiError {
    fn from(value: InventoryError) -> Self {
        match value {
            InventoryError::Validation(e) => e.into(),
            InventoryError::NotFound(_) => Self::NotFound(value.to_string()),
            InventoryError::InsufficientStock { .. } => Self::InsufficientStock(value.to_string()),
            InventoryError::Store(_) => Self::Internal(value.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Validation(errors) => Self::Validation(errors),
            AuthError::UsernameTaken(_) => Self::UsernameTaken(value.to_string()),
            AuthError::InvalidCredentials => Self::InvalidCredentials(value.to_string()),
            AuthError::InvalidToken(_) => Self::InvalidToken(value.to_string()),
            AuthError::Internal(_) => Self::Internal(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => validation_error(&errors),
            ApiError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::InsufficientStock(msg) => {
                json_error(StatusCode::CONFLICT, "insufficient_stock", msg)
            }
            ApiError::Authz(AuthzError::Unauthenticated) => json_error(
                StatusCode::UNAUTHORIZED,
                "not_authenticated",
                AuthzError::Unauthenticated.to_string(),
            ),
            ApiError::Authz(e @ AuthzError::Forbidden(_)) => {
                json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())
            }
            ApiError::UsernameTaken(msg) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "username_taken",
                    "message": msg,
                    "fields": { "username": [msg] },
                })),
            )
                .into_response(),
            ApiError::InvalidCredentials(msg) => {
                json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", msg)
            }
            ApiError::InvalidToken(msg) => json_error(StatusCode::UNAUTHORIZED, "invalid_token", msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed with internal error");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 400 with a per-field breakdown: `{"fields": {"price": ["..."]}}`.
fn validation_error(errors: &ValidationErrors) -> Response {
    let mut fields: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for e in errors.iter() {
        fields.entry(e.field()).or_default().push(e.to_string());
    }

    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": errors.to_string(),
            "fields": fields,
        })),
    )
        .into_response()
}
