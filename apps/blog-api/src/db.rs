//! SQLite-backed document store for credentials and posts
//!
//! Uniqueness of usernames and emails is enforced by the schema, so the
//! service-level duplicate checks are only a fast path.

use anyhow::Result;
use async_trait::async_trait;
use blog_auth::{CredentialRecord, CredentialStore, NewCredential, StoreError, UniqueField};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use crate::posts::{NewPost, Post, PostPatch, PostStore, PostStoreError};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct DbUser {
    id: String,
    username: String,
    password_hash: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DbUser> for CredentialRecord {
    fn from(row: DbUser) -> Self {
        CredentialRecord {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct DbPost {
    id: String,
    title: String,
    content: String,
    author: String,
    tags_json: String,
    views: i64,
    show: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DbPost> for Post {
    type Error = PostStoreError;

    fn try_from(row: DbPost) -> Result<Self, Self::Error> {
        let tags = serde_json::from_str(&row.tags_json)
            .map_err(|e| PostStoreError::Backend(format!("Corrupt tags for {}: {}", row.id, e)))?;

        Ok(Post {
            id: row.id,
            title: row.title,
            content: row.content,
            author: row.author,
            tags,
            views: row.views,
            show: row.show,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, email, created_at, updated_at";
const POST_COLUMNS: &str =
    "id, title, content, author, tags_json, views, show, created_at, updated_at";

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        tracing::info!("Connecting to database: {}", database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database. One connection, since every SQLite
    /// memory connection is its own database.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        Self::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                author TEXT NOT NULL,
                tags_json TEXT NOT NULL DEFAULT '[]',
                views INTEGER NOT NULL DEFAULT 0,
                show INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at)")
            .execute(pool)
            .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    async fn find_user(&self, column: &str, value: &str) -> Result<Option<CredentialRecord>, StoreError> {
        let row: Option<DbUser> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?"))
                .bind(value)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        Ok(row.map(CredentialRecord::from))
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn post_backend(err: sqlx::Error) -> PostStoreError {
    PostStoreError::Backend(err.to_string())
}

/// Only UUIDs are ever issued, so anything else is a guaranteed miss.
fn is_well_formed(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        self.find_user("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        self.find_user("email", email).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<CredentialRecord>, StoreError> {
        if !is_well_formed(id) {
            return Ok(None);
        }
        self.find_user("id", id).await
    }

    async fn insert(&self, new: NewCredential) -> Result<CredentialRecord, StoreError> {
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.email)
        .bind(new.created_at)
        .bind(new.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(new.into_record(id)),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                let field = if db_err.message().contains("users.email") {
                    UniqueField::Email
                } else {
                    UniqueField::Username
                };
                tracing::warn!("Insert rejected by unique constraint on {:?}", field);
                Err(StoreError::Conflict(field))
            }
            Err(e) => Err(backend(e)),
        }
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<Post>, i64), PostStoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(post_backend)?;

        let rows: Vec<DbPost> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(post_backend)?;

        let posts = rows
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((posts, total))
    }

    async fn get(&self, id: &str) -> Result<Option<Post>, PostStoreError> {
        if !is_well_formed(id) {
            return Ok(None);
        }

        let row: Option<DbPost> =
            sqlx::query_as(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(post_backend)?;

        row.map(Post::try_from).transpose()
    }

    async fn insert(&self, new: NewPost) -> Result<Post, PostStoreError> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            content: new.content,
            author: new.author,
            tags: new.tags,
            views: 0,
            show: new.show,
            created_at: now,
            updated_at: now,
        };

        let tags_json = serde_json::to_string(&post.tags)
            .map_err(|e| PostStoreError::Backend(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO posts (id, title, content, author, tags_json, views, show, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(&tags_json)
        .bind(post.views)
        .bind(post.show)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(post_backend)?;

        Ok(post)
    }

    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, PostStoreError> {
        if !is_well_formed(id) {
            return Ok(None);
        }

        let mut tx = self.pool.begin().await.map_err(post_backend)?;

        let row: Option<DbPost> =
            sqlx::query_as(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(post_backend)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut post = Post::try_from(row)?;
        patch.apply(&mut post, Utc::now());

        let tags_json = serde_json::to_string(&post.tags)
            .map_err(|e| PostStoreError::Backend(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, content = ?, author = ?, tags_json = ?, views = ?, show = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(&tags_json)
        .bind(post.views)
        .bind(post.show)
        .bind(post.updated_at)
        .bind(&post.id)
        .execute(&mut *tx)
        .await
        .map_err(post_backend)?;

        tx.commit().await.map_err(post_backend)?;
        Ok(Some(post))
    }

    async fn delete(&self, id: &str) -> Result<bool, PostStoreError> {
        if !is_well_formed(id) {
            return Ok(false);
        }

        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(post_backend)?;

        Ok(result.rows_affected() > 0)
    }
}
