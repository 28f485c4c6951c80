//! Request and response bodies for the blog API

use blog_auth::PublicUser;
use serde::{Deserialize, Serialize};

use crate::posts::{Pagination, Post, PostPatch};

/// Missing fields deserialize as empty strings and fail validation in the
/// auth service rather than at the JSON layer.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Envelope used by every successful JSON response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostListResponse {
    pub data: Vec<Post>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub show: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub show: Option<bool>,
    pub views: Option<i64>,
}

impl From<UpdatePostRequest> for PostPatch {
    fn from(req: UpdatePostRequest) -> Self {
        PostPatch {
            title: req.title,
            content: req.content,
            author: req.author,
            tags: req.tags,
            show: req.show,
            views: req.views,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}
