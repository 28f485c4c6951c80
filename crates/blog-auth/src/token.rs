//! Session tokens signed with HS256.
//!
//! Tokens are standard three-segment JWTs. Expiry is checked here against a
//! caller-supplied `now` (strictly, no leeway) rather than inside
//! `jsonwebtoken`, so the clock stays injectable.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Fixed token lifetime.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Claims embedded in every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Subject: the credential record id
    pub sub: String,
    pub username: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Only the `alg` field matters before signature verification.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Issues and verifies session tokens with a process-wide symmetric secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a claim set for `subject_id` valid from `now` until `now + 24h`.
    ///
    /// `now` is truncated to whole seconds.
    pub fn issue(
        &self,
        subject_id: &str,
        subject_username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject_id.to_string(),
            username: subject_username.to_string(),
            iat,
            exp: iat + Duration::hours(TOKEN_LIFETIME_HOURS).num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature, algorithm family and expiry, returning the claims.
    ///
    /// A token is valid while `now <= exp`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        check_algorithm(token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(map_jwt_error)?
            .claims;

        let expires_at = claims
            .expires_at()
            .ok_or_else(|| AuthError::MalformedToken("exp out of range".to_string()))?;
        if now > expires_at {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

/// Reject anything outside the HMAC family before touching the signature,
/// including `none` and algorithms `jsonwebtoken` cannot even parse.
fn check_algorithm(token: &str) -> Result<(), AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let header_json = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|_| AuthError::MalformedToken("invalid base64 in header".to_string()))?;
    let header: RawHeader = serde_json::from_slice(&header_json)
        .map_err(|_| AuthError::MalformedToken("invalid header".to_string()))?;

    match header.alg.as_str() {
        "HS256" | "HS384" | "HS512" => Ok(()),
        _ => Err(AuthError::SigningMethodMismatch),
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::SigningMethodMismatch,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidToken => AuthError::MalformedToken("malformed token".to_string()),
        ErrorKind::Base64(_) => AuthError::MalformedToken("invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::MalformedToken("unexpected claim set".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::MalformedToken(format!("missing claim: {claim}"))
        }
        _ => AuthError::MalformedToken(err.to_string()),
    }
}
