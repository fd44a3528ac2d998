//! SQLite repositories
//!
//! Types (UserRow, PostRow, etc.) should be imported from `crate::data::types`.

pub mod post;
pub mod user;

pub use post::create_post;
pub use user::{
    EMAIL_TAKEN, create_user, delete_user, export_users, get_by_email, get_user, list_users,
    update_user,
};
