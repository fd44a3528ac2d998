//! Repository traits
//!
//! The API layer talks to storage only through these traits, so handlers stay
//! independent of the SQLite backend.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::data::error::DataError;
use crate::data::types::{
    ExportUsersParams, ListUsersParams, NewUser, PostRow, UserChanges, UserExportRow, UserRow,
};

/// Repository trait for user and post operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    // ==================== User Operations ====================

    /// List users with filter, sort and paging; returns rows and filtered total
    async fn list_users(&self, params: &ListUsersParams)
    -> Result<(Vec<UserRow>, u64), DataError>;

    /// Get a user by ID
    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError>;

    /// Get a user by email (case-insensitive)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DataError>;

    /// Create a user; duplicate email yields `DataError::Conflict`
    async fn create_user(&self, user: &NewUser) -> Result<UserRow, DataError>;

    /// Apply a partial update; `None` if the user does not exist
    async fn update_user(
        &self,
        id: i64,
        changes: &UserChanges,
    ) -> Result<Option<UserRow>, DataError>;

    /// Delete a user and their posts; `false` if the user does not exist
    async fn delete_user(&self, id: i64) -> Result<bool, DataError>;

    // ==================== Post Operations ====================

    /// Create a post for a user
    async fn create_post(&self, user_id: i64, title: &str) -> Result<PostRow, DataError>;

    // ==================== Export ====================

    /// Lazily stream export rows from a database cursor
    fn export_users(
        &self,
        params: ExportUsersParams,
    ) -> BoxStream<'static, Result<UserExportRow, DataError>>;
}
