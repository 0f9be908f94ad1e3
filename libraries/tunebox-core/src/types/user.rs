/// User domain types
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account as exposed to the rest of the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Unique login name
    pub username: String,

    /// Unique email address, used to sign in
    pub email: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored password hash
///
/// Only the identity store produces this, and only for sign-in.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// The account the hash belongs to
    pub user: User,

    /// One-way password hash
    pub password_hash: String,
}

/// Data needed to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login name
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Already-hashed password
    pub password_hash: String,
}
