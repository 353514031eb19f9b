//! glaciar-server library - HTTP service for the GlaciarIng project tracker
//!
//! Routes fall in three groups: public (health, login, session), reader
//! (any logged-in user: listing, search, export, statistics) and admin
//! (create, update, delete, import).

use axum::extract::DefaultBodyLimit;
use axum::Router;
use glaciar_common::config::TomlConfig;
use glaciar_common::db::ProjectStore;
use glaciar_common::import::ValidationRules;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod session;

use session::SessionStore;

/// Largest accepted request body (CSV uploads and bulk imports)
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Project records and user accounts
    pub store: ProjectStore,
    pub sessions: SessionStore,
    pub rules: ValidationRules,
}

impl AppState {
    pub fn new(store: ProjectStore, sessions: SessionStore, rules: ValidationRules) -> Self {
        Self {
            store,
            sessions,
            rules,
        }
    }

    /// State configured from the bootstrap config
    pub fn from_config(store: ProjectStore, config: &TomlConfig) -> Self {
        Self::new(
            store,
            SessionStore::with_ttl_minutes(config.session_ttl_minutes),
            ValidationRules {
                monto_max: config.monto_max,
            },
        )
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Admin routes (write access)
    let admin = Router::new()
        .route("/api/proyectos", post(api::create_project))
        .route(
            "/api/proyectos/:id",
            put(api::update_project).delete(api::delete_project),
        )
        .route("/api/proyectos/bulk-delete", post(api::bulk_delete))
        .route("/api/proyectos/bulk-import", post(api::bulk_import))
        .route("/api/proyectos/import-csv", post(api::import_csv))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    // Reader routes (any logged-in user)
    let reader = Router::new()
        .route("/api/status-options", get(api::status_options))
        .route("/api/proyectos", get(api::list_projects))
        .route("/api/proyectos/export.csv", get(api::export_csv))
        .route("/api/proyectos/:id", get(api::get_project))
        .route("/api/statistics", get(api::get_statistics))
        .route("/api/logout", post(api::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    // Public routes (no session)
    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/login", get(api::serve_login))
        .route("/modify-database", get(api::serve_modify_database))
        .route("/modify-database.html", get(api::serve_modify_database))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/login", post(api::login))
        .route("/api/session", get(api::session_info))
        .merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(reader)
        .merge(public)
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
