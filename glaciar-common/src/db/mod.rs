//! Database access
//!
//! SQLite schema creation, migrations and the project store.

pub mod init;
pub mod migrations;
pub mod store;

pub use init::{init_database, init_memory_database};
pub use store::{ProjectQuery, ProjectStore, Statistics, StatusStats, UpdateResult};
