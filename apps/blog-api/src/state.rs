//! Application state for the blog API

use std::sync::Arc;

use anyhow::Result;
use blog_auth::{AuthService, CredentialStore, MemoryCredentialStore, TokenCodec};
use tracing::info;

use crate::config::{Args, StoreBackend};
use crate::db::SqliteStore;
use crate::posts::{MemoryPostStore, PostStore};

/// Shared application state
pub struct AppState {
    pub auth: AuthService,
    pub posts: Arc<dyn PostStore>,
}

impl AppState {
    pub fn new(auth: AuthService, posts: Arc<dyn PostStore>) -> Self {
        Self { auth, posts }
    }

    /// Build the state for the backend chosen on the command line.
    pub async fn from_args(args: &Args) -> Result<Self> {
        let codec = TokenCodec::new(args.jwt_secret.as_bytes());

        let (credentials, posts): (Arc<dyn CredentialStore>, Arc<dyn PostStore>) =
            match args.store {
                StoreBackend::Memory => {
                    info!("Using in-memory store; data is lost on restart");
                    (
                        Arc::new(MemoryCredentialStore::new()),
                        Arc::new(MemoryPostStore::new()),
                    )
                }
                StoreBackend::Sqlite => {
                    let store = Arc::new(SqliteStore::connect(&args.database_url).await?);
                    let credentials: Arc<dyn CredentialStore> = store.clone();
                    (credentials, store as Arc<dyn PostStore>)
                }
            };

        Ok(Self::new(AuthService::new(credentials, codec), posts))
    }
}
