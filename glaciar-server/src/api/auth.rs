//! Session middleware and login endpoints
//!
//! Reader routes require any live session; admin routes additionally
//! require the admin role. The authenticated [`User`] is placed in the
//! request extensions for handlers that want to log who acted.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use glaciar_common::api::auth::verify_credentials;
use glaciar_common::api::{ApiAuthError, ApiResponse, LoginRequest, SessionInfo, User};
use tracing::{info, warn};

use super::{ApiError, ApiJson};
use crate::session::{clear_session_cookie, session_cookie, token_from_headers};
use crate::AppState;

/// Resolve the session carried by `headers`, extending it
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = token_from_headers(headers)
        .ok_or_else(|| ApiError::Unauthorized("Se requiere iniciar sesión".to_string()))?;

    state
        .sessions
        .touch(&token)
        .await
        .map(|session| session.user)
        .ok_or_else(|| ApiError::Unauthorized("La sesión expiró o no es válida".to_string()))
}

/// Session middleware for reader routes
///
/// Returns 401 when the request carries no live session.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Session middleware for admin routes
///
/// Returns 401 without a session and 403 for a reader.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;

    if !user.role.can_write() {
        warn!(
            "User '{}' denied {} {}",
            user.username,
            request.method(),
            request.uri().path()
        );
        return Err(ApiError::Forbidden(
            "Se requieren permisos de administrador".to_string(),
        ));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// POST /api/login
///
/// Checks the credentials and sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = match verify_credentials(state.store.pool(), &req.username, &req.password).await {
        Ok(user) => user,
        Err(ApiAuthError::InvalidCredentials) => {
            warn!("Failed login for '{}'", req.username.trim());
            return Err(ApiError::Unauthorized("Credenciales inválidas".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.sessions.create(user.clone()).await;
    info!("User '{}' logged in as {}", user.username, user.role);

    let cookie = session_cookie(&token, state.sessions.ttl());
    let body = ApiResponse::ok(SessionInfo::user(user.username, user.role))
        .with_message("Sesión iniciada");

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = token_from_headers(&headers) {
        state.sessions.remove(&token).await;
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(ApiResponse::message("Sesión cerrada")),
    )
        .into_response()
}

/// GET /api/session
///
/// Reports who is logged in without extending the session.
pub async fn session_info(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionInfo> {
    let session = match token_from_headers(&headers) {
        Some(token) => state.sessions.peek(&token).await,
        None => None,
    };

    Json(match session {
        Some(s) => SessionInfo::user(s.user.username, s.user.role),
        None => SessionInfo::anonymous(),
    })
}

/// Session lookup for page handlers, which redirect instead of failing
pub(crate) async fn page_user(state: &AppState, headers: &HeaderMap) -> Option<User> {
    authenticate(state, headers).await.ok()
}
