use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account in the identity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Lowercased at registration; unique across accounts.
    pub email: String,
    /// Argon2 hash in PHC string format. Never serialized out.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
