//! UserRepository trait implementation for SQLite
//!
//! Implements the UserRepository trait for Arc<SqliteService> by delegating
//! to the free functions in `repositories`.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::data::error::DataError;
use crate::data::traits::UserRepository;
use crate::data::types::{
    ExportUsersParams, ListUsersParams, NewUser, PostRow, UserChanges, UserExportRow, UserRow,
};

use super::SqliteService;
use super::repositories::{post, user};

#[async_trait]
impl UserRepository for Arc<SqliteService> {
    // ==================== User Operations ====================

    async fn list_users(
        &self,
        params: &ListUsersParams,
    ) -> Result<(Vec<UserRow>, u64), DataError> {
        user::list_users(self.pool(), params)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), id).await.map_err(Into::into)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DataError> {
        user::get_by_email(self.pool(), email)
            .await
            .map_err(Into::into)
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<UserRow, DataError> {
        user::create_user(self.pool(), new_user)
            .await
            .map_err(Into::into)
    }

    async fn update_user(
        &self,
        id: i64,
        changes: &UserChanges,
    ) -> Result<Option<UserRow>, DataError> {
        user::update_user(self.pool(), id, changes)
            .await
            .map_err(Into::into)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DataError> {
        user::delete_user(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    // ==================== Post Operations ====================

    async fn create_post(&self, user_id: i64, title: &str) -> Result<PostRow, DataError> {
        post::create_post(self.pool(), user_id, title)
            .await
            .map_err(Into::into)
    }

    // ==================== Export ====================

    fn export_users(
        &self,
        params: ExportUsersParams,
    ) -> BoxStream<'static, Result<UserExportRow, DataError>> {
        user::export_users(self.pool().clone(), params)
            .map(|row| row.map_err(DataError::from))
            .boxed()
    }
}
