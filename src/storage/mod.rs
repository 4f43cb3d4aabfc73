//! SQLite persistence for the `users` table.
//!
//! The store is a thin handle around a [`SqlitePool`]. It is created once at
//! startup and injected into the HTTP layer as an axum `Extension`, so tests can
//! run the same code against an in-memory database.

pub mod users;

pub use self::users::{FieldValue, NewUser, User, UserField, UserFilter};

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Connection, SqlitePool,
};
use std::{path::Path, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::{debug, info_span, Instrument};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

// Extended result codes reported by SQLite for uniqueness failures.
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT_SECONDS: u64 = 30;

/// Failures surfaced by [`UserStore`] operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A row with the same `phone` (or `id`) already exists.
    #[error("unique constraint violated")]
    ConstraintViolation,
    /// Attempted to rewrite a column that never changes after insert.
    #[error("column {0} is immutable")]
    Immutable(&'static str),
    /// Any other driver level failure (I/O, SQL, pool).
    #[error("storage fault: {0}")]
    Fault(#[from] sqlx::Error),
}

impl StorageError {
    /// Classify a driver error, folding uniqueness failures into `ConstraintViolation`.
    #[must_use]
    pub fn classify(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            Self::ConstraintViolation
        } else {
            Self::Fault(err)
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().is_some_and(|code| {
                matches!(
                    code.as_ref(),
                    SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY
                )
            }) || db_err.is_unique_violation()
        }
        _ => false,
    }
}

/// Process scoped handle to the user database.
#[derive(Clone, Debug)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// Open (creating if needed) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the pool cannot connect.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECONDS))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` sees its own database, so the pool
    /// is pinned to a single connection that is never recycled.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory SQLite options")?;

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the `users` table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the schema statements fail.
    pub async fn migrate(&self) -> Result<()> {
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "CREATE",
            db.statement = SCHEMA_SQL
        );
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("Failed to apply database schema")?;

        debug!("database schema applied");

        Ok(())
    }

    /// Acquire a connection and ping it.
    ///
    /// # Errors
    /// Returns the driver error if the database is unreachable.
    pub async fn ping(&self) -> Result<(), StorageError> {
        let acquire_span = info_span!("db.acquire", db.system = "sqlite", db.operation = "ACQUIRE");
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "sqlite", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        debug!("database pool closed");
    }
}
