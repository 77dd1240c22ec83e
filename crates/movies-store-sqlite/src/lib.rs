//! SQLite backend for the movie dataset loader.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One connection serves schema setup,
//! the load transaction and the reports.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::TABLE_NAMES;
pub use store::SqliteStore;
