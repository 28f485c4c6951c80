//! Blog post endpoints
//!
//! Reads are public; writes sit behind `require_auth`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{CreatePostRequest, DataResponse, PostListResponse, UpdatePostRequest};
use crate::posts::{ListQuery, NewPost, PageRequest, Post};
use crate::state::AppState;

/// Handler: GET /blogs
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = PageRequest::from_query(&query);
    let (posts, total) = state.posts.list(page.offset(), page.limit).await?;

    Ok(Json(PostListResponse {
        data: posts,
        pagination: page.with_total(total),
    }))
}

/// Handler: GET /blogs/:id
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Post>>, ApiError> {
    let post = state
        .posts
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    Ok(Json(DataResponse::new(post)))
}

/// Handler: POST /blogs
///
/// The author is always the authenticated user.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Post>>), ApiError> {
    let Json(req) = payload?;

    if req.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("title is required".to_string()));
    }

    let post = state
        .posts
        .insert(NewPost {
            title: req.title,
            content: req.content,
            author: user.username.clone(),
            tags: req.tags,
            show: req.show.unwrap_or(true),
        })
        .await?;

    info!("Created post {} by {}", post.id, user.username);
    Ok((StatusCode::CREATED, Json(DataResponse::new(post))))
}

/// Handler: PUT /blogs/:id
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<DataResponse<Post>>, ApiError> {
    let Json(req) = payload?;

    if matches!(&req.title, Some(title) if title.trim().is_empty()) {
        return Err(ApiError::InvalidRequest("title must not be empty".to_string()));
    }

    let post = state
        .posts
        .update(&id, req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    info!("Updated post {} by {}", post.id, user.username);
    Ok(Json(DataResponse::new(post)))
}

/// Handler: DELETE /blogs/:id
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.posts.delete(&id).await? {
        return Err(ApiError::NotFound("Post".to_string()));
    }

    info!("Deleted post {} by {}", id, user.username);
    Ok(StatusCode::NO_CONTENT)
}
