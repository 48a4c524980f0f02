//! Opening the registry database.
//!
//! File databases run in WAL mode so that status writes from control calls
//! do not block concurrent listings; a busy timeout absorbs the short
//! writer contention that remains. Migrations run on every open.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::device_registry::SqliteDeviceRegistry;
use crate::error::StorageError;

/// Connections kept by default; the registry issues short single-row queries.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to open the device registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `SQLite` connection URL (e.g. `sqlite:onelight.db` or `sqlite::memory:`).
    pub database_url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl StoreConfig {
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// A private registry living as long as its pool.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:")
    }

    fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Open the database, creating the file if missing, apply pending
    /// migrations, and return the registry backed by it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is invalid, the database cannot be
    /// opened, or a migration fails.
    pub async fn open(&self) -> Result<SqliteDeviceRegistry, StorageError> {
        let pool = self.connect().await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(url = %self.database_url, max_connections = self.max_connections, "device registry ready");
        Ok(SqliteDeviceRegistry::new(pool))
    }

    async fn connect(&self) -> Result<SqlitePool, StorageError> {
        let mut options = SqliteConnectOptions::from_str(&self.database_url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !self.is_in_memory() {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections.max(1))
            .connect_with(options)
            .await?;
        Ok(pool)
    }
}
