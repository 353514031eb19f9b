//! Credential checks and shared API types
//!
//! Framework-free: the HTTP layer lives in `glaciar-server`.

pub mod auth;
pub mod types;

pub use auth::{ApiAuthError, Role, User};
pub use types::{ApiResponse, ErrorResponse, LoginRequest, SessionInfo};
