//! Shared data types
//!
//! Row types returned by the repositories and the params they accept.

mod users;

pub use users::{
    ExportUsersParams, ListUsersParams, NewUser, PageRequest, PostRow, UserChanges,
    UserExportRow, UserRow,
};

pub(crate) use users::{USER_COLUMNS, UserExportTuple, UserTuple};
