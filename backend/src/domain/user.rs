//! Credential subject (API user) entity.
//!
//! Users exist only for the identity component; they are deliberately not
//! entangled with residents or any other domain entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Role;

/// An account that can authenticate against the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary identifier; becomes the bearer-credential subject.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique login email (case-sensitive exact match on lookup).
    pub email: String,
    /// Salted one-way password hash.
    pub password_hash: String,
    /// Access role.
    pub role: Role,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a new user (seeding and future sign-up flows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Unique login email.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Access role.
    pub role: Role,
}
