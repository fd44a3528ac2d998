//! User and post row types plus list/export query params

use serde::{Deserialize, Serialize};

use crate::core::constants::{DEFAULT_TAKE, MAX_TAKE};
use crate::data::filters::{Predicate, SortSpec};

// ============================================================================
// Row types
// ============================================================================

/// User row from database (timestamps in unix seconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Column tuple matching [`USER_COLUMNS`]
pub(crate) type UserTuple = (i64, String, String, Option<i64>, i64, i64);

/// Select list for [`UserRow`]
pub(crate) const USER_COLUMNS: &str = "id, name, email, email_verified_at, created_at, updated_at";

impl From<UserTuple> for UserRow {
    fn from(
        (id, name, email, email_verified_at, created_at, updated_at): UserTuple,
    ) -> Self {
        Self {
            id,
            name,
            email,
            email_verified_at,
            created_at,
            updated_at,
        }
    }
}

/// Post row from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: i64,
}

/// One line of a user export
///
/// `posts` holds the user's post titles joined with `"; "` for the report
/// variant and is `None` for the plain export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserExportRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<i64>,
    pub created_at: i64,
    pub posts: Option<String>,
}

pub(crate) type UserExportTuple = (i64, String, String, Option<i64>, i64, Option<String>);

impl From<UserExportTuple> for UserExportRow {
    fn from(
        (id, name, email, email_verified_at, created_at, posts): UserExportTuple,
    ) -> Self {
        Self {
            id,
            name,
            email,
            email_verified_at,
            created_at,
            posts,
        }
    }
}

// ============================================================================
// Mutation params
// ============================================================================

/// Fields for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<i64>,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

// ============================================================================
// Query params
// ============================================================================

/// Skip/take window with the grid's clamping rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: i64,
    pub take: i64,
}

impl PageRequest {
    /// Negative `skip` becomes 0; `take` defaults to [`DEFAULT_TAKE`] and is
    /// clamped to `0..=MAX_TAKE`
    pub fn new(skip: Option<i64>, take: Option<i64>) -> Self {
        Self {
            skip: skip.unwrap_or(0).max(0),
            take: take.unwrap_or(DEFAULT_TAKE).clamp(0, MAX_TAKE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Parameters for listing users
#[derive(Debug, Clone, Default)]
pub struct ListUsersParams {
    pub predicate: Predicate,
    pub sort: Vec<SortSpec>,
    pub page: PageRequest,
}

/// Parameters for exporting users
#[derive(Debug, Clone)]
pub struct ExportUsersParams {
    /// Compiled against the `u` alias
    pub predicate: Predicate,
    pub max_rows: u64,
    pub with_posts: bool,
}
