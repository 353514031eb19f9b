//! Page serving routes
//!
//! Pages are static HTML; data is fetched by `app.js` from the JSON API.
//! The listing needs a session and the editing page needs the admin role;
//! otherwise the browser is redirected.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

use super::auth::page_user;
use crate::AppState;

const INDEX_HTML: &str = include_str!("../../ui/index.html");
const LOGIN_HTML: &str = include_str!("../../ui/login.html");
const MODIFY_DATABASE_HTML: &str = include_str!("../../ui/modify-database.html");
const APP_JS: &str = include_str!("../../ui/app.js");

/// GET /
pub async fn serve_index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match page_user(&state, &headers).await {
        Some(_) => Html(INDEX_HTML).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

/// GET /login
pub async fn serve_login() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// GET /modify-database
pub async fn serve_modify_database(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match page_user(&state, &headers).await {
        Some(user) if user.role.can_write() => Html(MODIFY_DATABASE_HTML).into_response(),
        Some(_) => Redirect::to("/").into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript; charset=utf-8")],
        APP_JS,
    )
        .into_response()
}
