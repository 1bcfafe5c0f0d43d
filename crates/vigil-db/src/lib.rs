//! Vigil Listing Store
//!
//! Provides `SQLite` access for saved searches and discovered listings.
//! Uses `SQLx` with embedded, versioned migrations.
//!
//! # Architecture
//!
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//! - **Timestamps**: stored as RFC3339 text, compared chronologically
//! - **Sharing**: the store is shared between the acquisition engine
//!   (read/write during a cycle) and the configuration UI (between cycles);
//!   per-statement durability is the only locking relied upon
//!
//! # Example
//!
//! ```ignore
//! use vigil_db::Database;
//!
//! let db = Database::open("vigil.db").await?;
//! db.run_migrations().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod listings;
pub mod migrations;
pub mod searches;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use listings::Listing;
pub use searches::SavedSearch;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// High-level store interface with pooling and migrations.
#[derive(Debug)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (or create) the store at the specified path.
    ///
    /// # Errors
    /// Returns `DatabaseError::Open` if the file cannot be opened or created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path
            .as_ref()
            .to_str()
            .ok_or_else(|| DatabaseError::Open("store path is not valid UTF-8".to_string()))?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to open store: {e}")))?;

        tracing::info!("Listing store opened at {}", path_str);

        Ok(Self { pool })
    }

    /// Open an in-memory store.
    ///
    /// The pool is pinned to a single connection so every query sees the
    /// same in-memory database. Intended for tests.
    pub async fn in_memory() -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(":memory:")
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to open in-memory store: {e}")))?;

        Ok(Self { pool })
    }

    /// Run all pending store migrations.
    ///
    /// Call after opening to ensure the schema is up to date.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    ///
    /// Returns the highest applied migration version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    ///
    /// This allows direct access to the `SQLx` pool for custom queries.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the store gracefully.
    ///
    /// Ensures all connections are properly closed before the pool drops.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Listing store closed");
    }
}
