//! Tunebox Storage
//!
//! Persistence for users, songs and playlists.
//!
//! Two back-ends implement the `tunebox_core` store traits with identical
//! behavior:
//!
//! - **`SqliteStore`**: relational storage over a `SQLite` pool with embedded
//!   migrations. Each feature owns its own queries (`users`, `songs`,
//!   `playlists`).
//! - **`MemoryStore`**: document-style collections held in process, used for
//!   tests and throwaway instances.
//!
//! # Example
//!
//! ```rust,no_run
//! use tunebox_storage::{create_pool, run_migrations, SqliteStore};
//! use tunebox_core::UserStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://tunebox.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteStore::new(pool);
//! let users = store.get_all_users().await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod memory;

// Vertical slices
pub mod playlists;
pub mod songs;
pub mod users;

pub use context::SqliteStore;
pub use error::StorageError;
pub use memory::MemoryStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

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
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://tunebox.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "creating sqlite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!("sqlite pool ready");

    Ok(pool)
}
