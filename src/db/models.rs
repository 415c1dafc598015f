use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored user row. `age` is always written as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// Fields copied from the identity provider's user object on first sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}
