//! HTTP API handlers for glaciar-server

pub mod auth;
pub mod error;
pub mod export;
pub mod extract;
pub mod health;
pub mod import;
pub mod projects;
pub mod statistics;
pub mod ui;

pub use auth::{login, logout, require_admin, require_session, session_info};
pub use error::{not_found, ApiError};
pub use export::export_csv;
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use health::health_routes;
pub use import::{bulk_import, import_csv};
pub use projects::{
    bulk_delete, create_project, delete_project, get_project, list_projects, status_options,
    update_project,
};
pub use statistics::get_statistics;
pub use ui::{serve_app_js, serve_index, serve_login, serve_modify_database};
