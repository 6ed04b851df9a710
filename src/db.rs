//! Connection pool and schema setup.
//!
//! Migrations under `migrations/` are embedded at compile time and applied on
//! start-up, so a fresh `sqlite::memory:` database is usable immediately.

use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Opens a pool for `database_url`.
///
/// An in-memory database lives only as long as its connection, so it is
/// pinned to a single connection that is never recycled.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let mut options = SqlitePoolOptions::new();
    options = if in_memory {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options.max_connections(max_connections.max(1))
    };

    options.connect(database_url).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Whether a write was rejected by a UNIQUE index.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map_or(false, |e| e.is_unique_violation())
}

/// `connect` followed by `run_migrations`.
pub async fn init(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = connect(database_url, max_connections).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
