//! Connection pool and the [`Store`] handle.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::config::{Config, DEFAULT_MAX_CONNECTIONS};
use crate::error::StoreResult;
use crate::schema;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub max_connections: u32,
    /// bcrypt work factor for newly hashed passwords.
    pub password_cost: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            password_cost: pharmastock_auth::password::DEFAULT_COST,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_connections: config.max_connections,
            password_cost: config.bcrypt_cost,
        }
    }
}

/// SQLite-backed pharmacy store.
///
/// Cloning is cheap; clones share the pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    password_cost: u32,
}

impl Store {
    /// Open (creating if needed) the database file at `path` and ensure the schema.
    pub async fn open(path: &Path, options: &StoreOptions) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let connect = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .connect_with(connect)
            .await?;

        tracing::info!(path = %path.display(), "opened database");
        Self::with_pool(pool, options.password_cost).await
    }

    /// Private in-memory database. One connection, kept alive for the pool's lifetime.
    pub async fn open_in_memory(options: &StoreOptions) -> StoreResult<Self> {
        let connect = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect)
            .await?;

        Self::with_pool(pool, options.password_cost).await
    }

    async fn with_pool(pool: SqlitePool, password_cost: u32) -> StoreResult<Self> {
        schema::create_schema(&pool).await?;
        Ok(Self {
            pool,
            password_cost,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Transaction that holds the write lock from its first statement.
    ///
    /// Read-then-write transactions must start here: a deferred one cannot
    /// upgrade its lock under WAL once another writer has committed, and fails
    /// with `SQLITE_BUSY` instead of waiting on the busy timeout.
    pub(crate) async fn begin_write(&self) -> StoreResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    pub(crate) fn password_cost(&self) -> u32 {
        self.password_cost
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// `%text%` for a `LIKE ... ESCAPE '\'` search, or `None` for blank input.
pub(crate) fn like_pattern(search: Option<&str>) -> Option<String> {
    let text = search.map(str::trim).filter(|s| !s.is_empty())?;
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}
