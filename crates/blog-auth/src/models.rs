//! Credential record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored identity.
///
/// Intentionally not `Serialize`: the password hash must never reach a
/// response body. Convert with [`CredentialRecord::to_public`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Store-assigned, immutable after insert
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Fields supplied to a store on insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewCredential {
    pub fn into_record(self, id: String) -> CredentialRecord {
        CredentialRecord {
            id,
            username: self.username,
            password_hash: self.password_hash,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Externally visible view of a credential record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
