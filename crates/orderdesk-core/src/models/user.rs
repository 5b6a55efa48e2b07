//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
///
/// The email is the external subject identifier carried in tokens. It is
/// stored exactly as supplied (case-preserved) and unique across users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Display name.
    pub name: String,
    pub email: String,
    /// Argon2id PHC string. Never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    /// Already-hashed verifier produced by the credential store.
    pub password_hash: String,
}
