//! Registration, login and current-user endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use blog_auth::PublicUser;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{DataResponse, LoginData, LoginRequest, RegisterRequest};
use crate::state::AppState;

/// Handler: POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<PublicUser>>), ApiError> {
    let Json(req) = payload?;

    let user = state
        .auth
        .register(&req.username, &req.password, &req.email)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(user.to_public())),
    ))
}

/// Handler: POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<DataResponse<LoginData>>, ApiError> {
    let Json(req) = payload?;

    let outcome = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(DataResponse::new(LoginData {
        token: outcome.token,
        user: outcome.user.to_public(),
    })))
}

/// Handler: GET /me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DataResponse<PublicUser>>, ApiError> {
    let record = state.auth.get_by_id(&user.id).await?;
    Ok(Json(DataResponse::new(record.to_public())))
}
