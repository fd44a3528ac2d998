//! Data storage layer
//!
//! - `sqlite` - Embedded transactional database (users, posts)
//! - `filters` - Grid filter/sort compilation into SQL predicates
//! - `types` - Row types and query params
//! - `traits` - Repository trait consumed by the API layer
//! - `error` - Unified error type for the data layer

pub mod error;
pub mod filters;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::UserRepository;

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::storage::AppStorage;

/// Transactional database service
///
/// Owns the SQLite service behind an `Arc` and hands out repository trait
/// objects to the API layer.
pub struct TransactionalService {
    sqlite: Arc<SqliteService>,
}

impl TransactionalService {
    /// Open the database under the storage directory and run migrations
    pub async fn init(storage: &AppStorage) -> Result<Self, DataError> {
        let service = SqliteService::init(storage).await?;
        Ok(Self {
            sqlite: Arc::new(service),
        })
    }

    /// Wrap an existing service (in-memory databases in tests)
    #[cfg(test)]
    pub fn from_sqlite(sqlite: SqliteService) -> Self {
        Self {
            sqlite: Arc::new(sqlite),
        }
    }

    /// Check that the database answers queries
    pub async fn ping(&self) -> Result<(), DataError> {
        self.sqlite.ping().await.map_err(Into::into)
    }

    /// Run a WAL checkpoint
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        self.sqlite.checkpoint().await.map_err(Into::into)
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        self.sqlite.close().await
    }

    /// Start the background checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        self.sqlite.start_checkpoint_task(shutdown_rx)
    }

    /// Get the repository trait object for data operations
    pub fn repository(&self) -> Box<dyn UserRepository + Send + Sync> {
        Box::new(Arc::clone(&self.sqlite))
    }
}
