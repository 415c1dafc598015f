//! Database module: the local shadow copy of identity-provider users.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: storage operations over the pool

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{NewUser, UserRecord};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, UsersStorage};
