//! Error types for the blog API

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blog_auth::AuthError;
use serde_json::json;
use thiserror::Error;

use crate::posts::PostStoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid authorization header format")]
    MalformedHeader,

    #[error("Token expired, please log in again")]
    TokenExpired,

    #[error("Invalid authentication token")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<PostStoreError> for ApiError {
    fn from(err: PostStoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::MissingToken
            | ApiError::MalformedHeader
            | ApiError::TokenExpired
            | ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            ApiError::Auth(err) => auth_status(err),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

fn auth_status(err: &AuthError) -> (StatusCode, String) {
    if !err.is_client_error() {
        tracing::error!("Auth infrastructure error: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal error".to_string(),
        );
    }

    match err {
        AuthError::Validation(_) | AuthError::DuplicateUsername | AuthError::DuplicateEmail => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
        AuthError::TokenExpired => (
            StatusCode::UNAUTHORIZED,
            ApiError::TokenExpired.to_string(),
        ),
        _ if err.is_token_error() => (
            StatusCode::UNAUTHORIZED,
            ApiError::Unauthenticated.to_string(),
        ),
        _ => (StatusCode::NOT_FOUND, "User not found".to_string()),
    }
}
