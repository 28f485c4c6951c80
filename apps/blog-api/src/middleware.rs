//! Bearer-token gate for protected routes.
//!
//! On success the verified identity is attached to the request as an
//! [`AuthUser`] extension; handlers take it with `Extension<AuthUser>`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use blog_auth::{AuthError, AuthService};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Identity taken from a verified session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state.auth, req.headers())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Read `Authorization: Bearer <token>` and verify the token.
pub fn authenticate(auth: &AuthService, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(ApiError::MissingToken)?
        .to_str()
        .map_err(|_| ApiError::MalformedHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    let token = match parts.as_slice() {
        ["Bearer", token] => *token,
        _ => return Err(ApiError::MalformedHeader),
    };

    match auth.validate_token(token) {
        Ok(claims) => Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
        }),
        Err(AuthError::TokenExpired) => {
            warn!("Rejected expired token");
            Err(ApiError::TokenExpired)
        }
        Err(err) => {
            warn!("Rejected token: {}", err);
            Err(ApiError::Unauthenticated)
        }
    }
}
