use crate::db::models::{NewUser, UserRecord};
use crate::db::schema::SQLITE_INIT;
use crate::error::ProjectError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct UsersStorage {
    pool: SqlitePool,
}

impl UsersStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the pool for `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, ProjectError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_opts = SqlitePoolOptions::new();
        if database_url.contains(":memory:") {
            // every connection to :memory: is its own database
            pool_opts = pool_opts
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_opts.connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        info!(database_url, "user storage ready");
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ProjectError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, ProjectError> {
        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, age FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Return the record for `user.email`, inserting it with `age = 0` when absent.
    ///
    /// The insert uses `ON CONFLICT(email) DO NOTHING` and the row is re-read
    /// afterwards, so concurrent first syncs for one email converge on a single row.
    pub async fn find_or_create(&self, user: NewUser) -> Result<UserRecord, ProjectError> {
        if let Some(existing) = self.find_by_email(&user.email).await? {
            debug!(id = existing.id, "user already synced");
            return Ok(existing);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (name, email, age) VALUES (?, ?, 0)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, age FROM users WHERE email = ?",
        )
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await?;

        if inserted > 0 {
            info!(id = record.id, "created local user record");
        } else {
            debug!(id = record.id, "lost insert race; returning existing user");
        }
        Ok(record)
    }

    pub async fn count(&self) -> Result<i64, ProjectError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }
}
