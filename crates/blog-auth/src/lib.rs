//! Authentication core for the blog backend
//!
//! This crate provides:
//! - Argon2id password hashing with the algorithm's default work factor
//! - HMAC-signed session tokens with a fixed 24 hour lifetime
//! - The credential store interface plus an in-memory implementation
//! - `AuthService`, which ties them together for register/login/validate
//!
//! HTTP concerns live in the `blog-api` app; nothing here knows about
//! requests or responses.

pub mod error;
pub mod models;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use models::{CredentialRecord, NewCredential, PublicUser};
pub use password::PasswordHasher;
pub use service::{AuthService, LoginOutcome, MIN_PASSWORD_LEN};
pub use store::{CredentialStore, MemoryCredentialStore, StoreError, UniqueField};
pub use token::{Claims, TokenCodec, TOKEN_LIFETIME_HOURS};
