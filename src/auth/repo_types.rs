use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                      // autoincrement user ID
    pub name: String,                 // unique login name
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed
    pub created_at: OffsetDateTime,   // creation timestamp
}

/// What the profile page shows about a user.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub name: String,
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            name: u.name,
            created_at: u.created_at,
        }
    }
}
