//! Blog API Server
//!
//! Provides REST endpoints for:
//! - Account registration and login with bearer tokens
//! - Blog post CRUD (public reads, authenticated writes)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod posts;
mod routes;
mod state;
#[cfg(test)]
mod tests;

use config::Args;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    args.validate()?;

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(log_level.into())
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing blog API with {:?} store...", args.store);
    let state = Arc::new(AppState::from_args(&args).await?);

    let app = routes::router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting blog API on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
