//! todosvc - owner-scoped todos over HTTP, stored in ClickHouse
//!
//! - `store`: shared store client (ClickHouse HTTP interface)
//! - `repository`: create / list / complete operations
//! - `api`: axum router and JSON handlers

pub mod api;
pub mod config;
pub mod error;
pub mod id;
pub mod repository;
pub mod store;
pub mod types;

pub use error::{Error, Result};
