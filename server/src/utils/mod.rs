//! Utility functions for the application

pub mod crypto;
pub mod csv;
pub mod file;
pub mod sql;
