//! Error types for authentication operations

use thiserror::Error;

/// Authentication error types.
///
/// Every failure the auth core can produce maps to exactly one variant, so
/// the HTTP layer can pick a status code without inspecting messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Input failed shape or policy checks (empty field, short password).
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    /// Unknown username or wrong password. Deliberately a single variant.
    #[error("Invalid username or password")]
    InvalidCredentials,

    // Token errors
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token header declares an algorithm outside the HMAC family.
    #[error("Unexpected signing method")]
    SigningMethodMismatch,

    #[error("Token has expired")]
    TokenExpired,

    /// Token is not three base64url segments or its claims have the wrong shape.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Token could not be signed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Record not found")]
    NotFound,

    // Password errors
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// Credential store backend failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl AuthError {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// True for failures raised while verifying a session token.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidSignature
                | AuthError::SigningMethodMismatch
                | AuthError::TokenExpired
                | AuthError::MalformedToken(_)
        )
    }

    /// True for failures caused by the caller's input rather than the system.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AuthError::Hashing(_)
                | AuthError::InvalidHashFormat
                | AuthError::Signing(_)
                | AuthError::Store(_)
        )
    }
}
