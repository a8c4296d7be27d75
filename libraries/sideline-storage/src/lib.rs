//! Sideline Storage
//!
//! Durable persistence for the soundboard: clip bytes (the blob store) and
//! serialized records (library metadata and toggles).
//!
//! # Architecture
//!
//! - **Vertical Slicing**: `blobs` and `records` each own their queries
//! - **Trait-backed**: `SqliteBlobStore`/`SqliteRecordStore` implement the
//!   `sideline_core` store traits, so callers never see SQL
//! - **Ephemeral sessions**: `memory` provides the same traits without a
//!   database, for tests and throwaway boards
//!
//! # Example
//!
//! ```rust,no_run
//! use sideline_core::{BlobId, BlobStore};
//! use sideline_storage::{create_pool, run_migrations, SqliteBlobStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://sideline.db").await?;
//! run_migrations(&pool).await?;
//!
//! let blobs = SqliteBlobStore::new(pool);
//! blobs.put(&BlobId::new("kick"), vec![0, 1, 2]).await?;
//! # Ok(())
//! # }
//! ```

mod error;

// Vertical slices
pub mod blobs;
pub mod records;

// Database-free stores
pub mod memory;

pub use blobs::SqliteBlobStore;
pub use error::StorageError;
pub use memory::{MemoryBlobStore, MemoryRecordStore};
pub use records::SqliteRecordStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://sideline.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    debug!(url = database_url, "creating sqlite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    debug!("sqlite pool ready");

    Ok(pool)
}
