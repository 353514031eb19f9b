//! # GlaciarIng Common Library
//!
//! Shared code for the GlaciarIng project tracker:
//! - Project model and status options
//! - CSV import pipeline (column normalization, coercion, validation)
//! - Project store over SQLite
//! - Credential checks and API response types
//! - Configuration loading

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use model::{Estado, Project, ProjectFields};
