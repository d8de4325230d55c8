//! SQLite user record store for the agreement gate
//!
//! Implements [`eula_core::RecordStore`] on a single `users` table holding
//! each user's authority and agreement flag.
//!
//! ## Features
//!
//! - **Partial updates**: patches only touch the fields they set
//! - **Atomic batches**: `set_many` runs in one transaction
//! - **WAL Mode**: for file-backed databases
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eula_sqlite::{SqliteConfig, SqliteUserStore};
//!
//! let store = SqliteUserStore::open(&SqliteConfig::new("./eula.db"))?;
//! let accepted = store.get(UserId(42)).await?.is_some_and(|u| u.eula);
//! ```

pub mod config;
pub mod error;
pub mod schema;
pub mod user_store;

pub use config::SqliteConfig;
pub use error::{SqliteError, SqliteResult};
pub use user_store::SqliteUserStore;

/// Open the store described by the storage section of the configuration.
pub fn open_user_store(storage: &eula_config::StorageConfig) -> SqliteResult<SqliteUserStore> {
    SqliteUserStore::open(&SqliteConfig::from(storage))
}
