//! API route handlers

pub mod export;
pub mod health;
pub mod users;
