//! Startup configuration
//!
//! Every option can come from the command line or the environment; a `.env`
//! file is loaded first if present.

use clap::{Parser, ValueEnum};

/// Which backend holds credentials and posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Process-local maps, lost on restart
    Memory,
    /// SQLite database at `--database-url`
    Sqlite,
}

/// Command-line arguments for the blog server
#[derive(Parser, Debug, Clone)]
#[command(name = "blog-api")]
#[command(about = "Blog backend with bearer-token authentication")]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8088")]
    pub port: u16,

    /// Storage backend
    #[arg(long, env = "BLOG_STORE", value_enum, default_value = "sqlite")]
    pub store: StoreBackend,

    /// SQLite connection string (only used with `--store sqlite`)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:blog.db?mode=rwc")]
    pub database_url: String,

    /// Symmetric secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        Ok(())
    }
}
