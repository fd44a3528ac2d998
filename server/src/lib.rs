//! Usergrid server library
//!
//! User management backend for data grids: filterable, sortable, paged user
//! listing with CSV export.

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod utils;
