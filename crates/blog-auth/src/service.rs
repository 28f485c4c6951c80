//! Registration, login and token validation.
//!
//! `AuthService` is stateless apart from the store handle, the hasher
//! settings and the token codec. It is cheap to clone and share across
//! request tasks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::models::{CredentialRecord, NewCredential};
use crate::password::PasswordHasher;
use crate::store::{CredentialStore, StoreError, UniqueField};
use crate::token::{Claims, TokenCodec};

/// Minimum password length in bytes accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Successful login: a fresh token plus the matching record.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: CredentialRecord,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, codec: TokenCodec) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
            codec,
        }
    }

    /// Replace the password hasher; tests use this for cheap parameters.
    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Create a credential record.
    ///
    /// The username/email checks here are a fast path for friendly errors;
    /// a store-level conflict on insert maps to the same errors.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<CredentialRecord, AuthError> {
        if username.is_empty() || password.is_empty() || email.is_empty() {
            return Err(AuthError::Validation(
                "username, password and email are required".to_string(),
            ));
        }
        // Length is measured in UTF-8 bytes
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} bytes"
            )));
        }

        if self.store.find_by_username(username).await.map_err(store_error)?.is_some() {
            return Err(AuthError::DuplicateUsername);
        }
        if self.store.find_by_email(email).await.map_err(store_error)?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash_password(password).await?;

        let now = Utc::now();
        let record = self
            .store
            .insert(NewCredential {
                username: username.to_string(),
                password_hash,
                email: email.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(store_error)?;

        info!(user_id = %record.id, username = %record.username, "Registered user");
        Ok(record)
    }

    /// Check credentials and issue a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let Some(user) = self.store.find_by_username(username).await.map_err(store_error)? else {
            warn!(username, "Login rejected: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            warn!(username, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.codec.issue(&user.id, &user.username, Utc::now())?;

        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(LoginOutcome { token, user })
    }

    /// Verify a session token against the current time.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = self.codec.verify(token, now)?;
        debug!(user_id = %claims.sub, "Token validated");
        Ok(claims)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<CredentialRecord, AuthError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .ok_or(AuthError::NotFound)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(format!("verification task failed: {e}")))?
    }
}

fn store_error(err: StoreError) -> AuthError {
    match err {
        StoreError::Conflict(UniqueField::Username) => AuthError::DuplicateUsername,
        StoreError::Conflict(UniqueField::Email) => AuthError::DuplicateEmail,
        StoreError::Backend(msg) => AuthError::Store(msg),
    }
}
