//! Blog posts: model, store interface, in-memory store and paging

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A blog post as stored and returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    pub views: i64,
    pub show: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    pub show: bool,
}

/// Partial update; `None` leaves a field untouched.
///
/// `tags: Some(vec![])` clears the tags.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub show: Option<bool>,
    pub views: Option<i64>,
}

impl PostPatch {
    pub fn apply(self, post: &mut Post, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(author) = self.author {
            post.author = author;
        }
        if let Some(tags) = self.tags {
            post.tags = tags;
        }
        if let Some(show) = self.show {
            post.show = show;
        }
        if let Some(views) = self.views {
            post.views = views;
        }
        post.updated_at = now;
    }
}

#[derive(Debug, Error)]
pub enum PostStoreError {
    #[error("Backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// One page of posts, newest first, plus the total count.
    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<Post>, i64), PostStoreError>;

    /// `Ok(None)` for a miss or an id this store could never have issued.
    async fn get(&self, id: &str) -> Result<Option<Post>, PostStoreError>;

    async fn insert(&self, new: NewPost) -> Result<Post, PostStoreError>;

    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, PostStoreError>;

    /// Returns false when nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool, PostStoreError>;
}

#[derive(Default)]
struct MemoryPosts {
    posts: HashMap<u64, Post>,
    next_id: u64,
}

/// Mutex-guarded map keyed by a monotonic counter
#[derive(Default)]
pub struct MemoryPostStore {
    state: Mutex<MemoryPosts>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryPosts>, PostStoreError> {
        self.state
            .lock()
            .map_err(|_| PostStoreError::Backend("post store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<Post>, i64), PostStoreError> {
        let state = self.lock()?;

        let mut posts: Vec<&Post> = state.posts.values().collect();
        // Ids break ties between posts created in the same instant
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| id_key(&b.id).cmp(&id_key(&a.id)))
        });

        let total = posts.len() as i64;
        let page = posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn get(&self, id: &str) -> Result<Option<Post>, PostStoreError> {
        let Ok(key) = id.parse::<u64>() else {
            return Ok(None);
        };
        Ok(self.lock()?.posts.get(&key).cloned())
    }

    async fn insert(&self, new: NewPost) -> Result<Post, PostStoreError> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let id = state.next_id;

        let now = Utc::now();
        let post = Post {
            id: id.to_string(),
            title: new.title,
            content: new.content,
            author: new.author,
            tags: new.tags,
            views: 0,
            show: new.show,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(id, post.clone());

        Ok(post)
    }

    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, PostStoreError> {
        let Ok(key) = id.parse::<u64>() else {
            return Ok(None);
        };
        let mut state = self.lock()?;
        let Some(post) = state.posts.get_mut(&key) else {
            return Ok(None);
        };

        patch.apply(post, Utc::now());
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, PostStoreError> {
        let Ok(key) = id.parse::<u64>() else {
            return Ok(false);
        };
        Ok(self.lock()?.posts.remove(&key).is_some())
    }
}

fn id_key(id: &str) -> u64 {
    id.parse().unwrap_or_default()
}

/// Raw `?page=&limit=` values. Kept as strings so junk falls back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

/// Resolved page/limit after applying defaults and bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn from_query(query: &ListQuery) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let limit = query
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| (1..=MAX_PAGE_LIMIT).contains(l))
            .unwrap_or(DEFAULT_PAGE_LIMIT);

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn with_total(self, total: i64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
        }
    }
}
