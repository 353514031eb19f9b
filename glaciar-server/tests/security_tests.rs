//! Access control tests: role checks and session validity

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Duration;
use glaciar_common::api::auth::upsert_user;
use glaciar_common::api::Role;
use glaciar_common::db::ProjectStore;
use glaciar_common::import::ValidationRules;
use glaciar_server::session::SessionStore;
use glaciar_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn setup_app(sessions: SessionStore) -> Router {
    let store = ProjectStore::open_in_memory().await.unwrap();
    upsert_user(store.pool(), "admin", "clave-admin", Role::Admin)
        .await
        .unwrap();
    upsert_user(store.pool(), "lector", "clave-lector", Role::Reader)
        .await
        .unwrap();
    build_router(AppState::new(store, sessions, ValidationRules::default()))
}

fn request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/login",
            None,
            json!({"username": username, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

fn admin_requests() -> Vec<(&'static str, &'static str, Value)> {
    vec![
        ("POST", "/api/proyectos", json!({"contrato": "Nuevo"})),
        ("PUT", "/api/proyectos/1001", json!({"estado": "Completado"})),
        ("DELETE", "/api/proyectos/1001", json!({})),
        ("POST", "/api/proyectos/bulk-delete", json!({"ids": [1001]})),
        ("POST", "/api/proyectos/bulk-import", json!({"proyectos": []})),
        ("POST", "/api/proyectos/import-csv", json!("Contrato\nX")),
    ]
}

#[tokio::test]
async fn test_reader_cannot_modify() {
    let app = setup_app(SessionStore::with_ttl_minutes(60)).await;
    let reader = login(&app, "lector", "clave-lector").await;

    for (method, uri, body) in admin_requests() {
        let response = app
            .clone()
            .oneshot(request(method, uri, Some(&reader), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_anonymous_cannot_modify() {
    let app = setup_app(SessionStore::with_ttl_minutes(60)).await;

    for (method, uri, body) in admin_requests() {
        let response = app
            .clone()
            .oneshot(request(method, uri, None, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_forged_cookie_rejected() {
    let app = setup_app(SessionStore::with_ttl_minutes(60)).await;

    let response = app
        .oneshot(request(
            "GET",
            "/api/proyectos",
            Some("glaciar_session=00000000000000000000000000000000"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_rejected() {
    let app = setup_app(SessionStore::new(Duration::zero())).await;
    let cookie = login(&app, "admin", "clave-admin").await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/proyectos", Some(&cookie), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request("GET", "/", Some(&cookie), json!({})))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
}

#[tokio::test]
async fn test_unknown_user_and_empty_credentials() {
    let app = setup_app(SessionStore::with_ttl_minutes(60)).await;

    for body in [
        json!({"username": "nadie", "password": "clave"}),
        json!({"username": "", "password": ""}),
    ] {
        let response = app
            .clone()
            .oneshot(request("POST", "/api/login", None, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_admin_passes_role_check() {
    let app = setup_app(SessionStore::with_ttl_minutes(60)).await;
    let admin = login(&app, "admin", "clave-admin").await;

    let response = app
        .oneshot(request(
            "DELETE",
            "/api/proyectos/1001",
            Some(&admin),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
