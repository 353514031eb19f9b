//! Integration tests for glaciar-server API endpoints
//!
//! Each test builds the full router over an in-memory database with one
//! admin and one reader account, and drives it with `oneshot` requests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use glaciar_common::api::auth::upsert_user;
use glaciar_common::api::Role;
use glaciar_common::db::ProjectStore;
use glaciar_common::import::ValidationRules;
use glaciar_server::session::SessionStore;
use glaciar_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Create app over a fresh in-memory database
async fn setup_app() -> Router {
    let store = ProjectStore::open_in_memory()
        .await
        .expect("Should open in-memory database");
    upsert_user(store.pool(), "admin", "clave-admin", Role::Admin)
        .await
        .unwrap();
    upsert_user(store.pool(), "lector", "clave-lector", Role::Reader)
        .await
        .unwrap();

    let state = AppState::new(
        store,
        SessionStore::with_ttl_minutes(60),
        ValidationRules::default(),
    );
    build_router(state)
}

/// Test helper: Request with an optional session cookie and JSON body
fn test_request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

/// Test helper: Log in and return the `Cookie` header value
async fn login(app: &Router, username: &str, password: &str) -> String {
    let request = test_request(
        "POST",
        "/api/login",
        None,
        Some(json!({"username": username, "password": password})),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Should set session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn sample_project(contrato: &str) -> Value {
    json!({
        "Contrato": contrato,
        "Cliente": "Depto Educación",
        "Región": "La Araucanía",
        "Ciudad": "Temuco",
        "Estado": "Activo",
        "Monto": "1500000",
        "fecha_inicio": "10/06/2014",
        "EMS": "Sí"
    })
}

async fn create(app: &Router, cookie: &str, body: Value) -> Value {
    let request = test_request("POST", "/api/proyectos", Some(cookie), Some(body));
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await
}

// =============================================================================
// Health and session
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/api/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "glaciar-server");
    assert_eq!(body["database"]["connected"], true);
    assert_eq!(body["database"]["projects"], 0);
}

#[tokio::test]
async fn test_reader_routes_require_session() {
    let app = setup_app().await;

    for uri in ["/api/proyectos", "/api/statistics", "/api/status-options", "/api/proyectos/1001"] {
        let response = app
            .clone()
            .oneshot(test_request("GET", uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_login_with_bad_password() {
    let app = setup_app().await;

    let request = test_request(
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "admin", "password": "incorrecta"})),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Credenciales inválidas");
}

#[tokio::test]
async fn test_session_info_and_logout() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/session", None, None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["authenticated"], false);

    let cookie = login(&app, "lector", "clave-lector").await;
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/session", Some(&cookie), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["username"], "lector");
    assert_eq!(body["role"], "reader");

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/logout", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let response = app
        .oneshot(test_request("GET", "/api/proyectos", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_create_and_get_project() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;

    let body = create(&app, &admin, sample_project("Mecánica de Suelos")).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Proyecto creado exitosamente");
    assert_eq!(body["data"]["id"], 1001);
    assert_eq!(body["data"]["region"], "La Araucanía");
    assert_eq!(body["data"]["monto"], 1500000.0);
    assert_eq!(body["data"]["fecha_inicio"], "2014-06-10");
    assert_eq!(body["data"]["ems"], true);
    assert_eq!(body["data"]["sondaje"], false);

    let reader = login(&app, "lector", "clave-lector").await;
    let response = app
        .oneshot(test_request("GET", "/api/proyectos/1001", Some(&reader), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["contrato"], "Mecánica de Suelos");
}

#[tokio::test]
async fn test_create_assigns_sequential_ids() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;

    let mut explicit = sample_project("Con id");
    explicit["id"] = json!(2000);
    assert_eq!(create(&app, &admin, explicit).await["data"]["id"], 2000);

    let mut zero = sample_project("Id cero");
    zero["ID"] = json!("0");
    assert_eq!(create(&app, &admin, zero).await["data"]["id"], 2001);
}

#[tokio::test]
async fn test_create_rejects_invalid_project() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;

    let request = test_request(
        "POST",
        "/api/proyectos",
        Some(&admin),
        Some(json!({
            "contrato": "X",
            "cliente": "Depto Educación",
            "region": "Maule",
            "ciudad": "Talca",
            "estado": "Cancelado",
            "monto": -5
        })),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    let details: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    assert_eq!(details.len(), 3);
    assert!(details.contains(&"El monto no puede ser negativo"));

    let response = app
        .oneshot(test_request("GET", "/api/health", None, None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["database"]["projects"], 0);
}

#[tokio::test]
async fn test_blank_estado_defaults_to_activo() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;

    let mut project = sample_project("Sin estado");
    project["Estado"] = json!("");
    let body = create(&app, &admin, project).await;
    assert_eq!(body["data"]["estado"], "Activo");
}

#[tokio::test]
async fn test_update_patches_existing_fields() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;
    create(&app, &admin, sample_project("Original")).await;

    let request = test_request(
        "PUT",
        "/api/proyectos/1001",
        Some(&admin),
        Some(json!({"Estado": "Completado", "Sondaje": "sí"})),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Proyecto actualizado exitosamente");
    assert_eq!(body["data"]["estado"], "Completado");
    assert_eq!(body["data"]["sondaje"], true);
    assert_eq!(body["data"]["contrato"], "Original");
    assert_eq!(body["data"]["ems"], true);

    let request = test_request(
        "PUT",
        "/api/proyectos/1001",
        Some(&admin),
        Some(json!({"monto": -1})),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = test_request(
        "PUT",
        "/api/proyectos/9999",
        Some(&admin),
        Some(json!({"estado": "Pendiente"})),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_project() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;
    create(&app, &admin, sample_project("Para borrar")).await;

    let response = app
        .clone()
        .oneshot(test_request("DELETE", "/api/proyectos/1001", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Proyecto eliminado exitosamente");

    let response = app
        .clone()
        .oneshot(test_request("DELETE", "/api/proyectos/1001", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(test_request("GET", "/api/proyectos/1001", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Proyecto no encontrado");
}

#[tokio::test]
async fn test_bulk_delete() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;
    for contrato in ["Uno", "Dos", "Tres"] {
        create(&app, &admin, sample_project(contrato)).await;
    }

    let request = test_request(
        "POST",
        "/api/proyectos/bulk-delete",
        Some(&admin),
        Some(json!({"ids": [1001, "1003", 5555]})),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["requested"], 3);
    assert_eq!(body["data"]["deleted"], 2);
    assert_eq!(body["message"], "Eliminados 2 proyectos exitosamente");

    let request = test_request(
        "POST",
        "/api/proyectos/bulk-delete",
        Some(&admin),
        Some(json!({"ids": []})),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No se proporcionaron IDs");

    let request = test_request(
        "POST",
        "/api/proyectos/bulk-delete",
        Some(&admin),
        Some(json!({"ids": ["abc"]})),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Listing, search, statistics
// =============================================================================

#[tokio::test]
async fn test_list_with_filters() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;

    create(&app, &admin, sample_project("Mecánica de Suelos")).await;
    let mut other = sample_project("Topografía Ruta 5");
    other["Cliente"] = json!("Vialidad");
    other["Estado"] = json!("Pendiente");
    create(&app, &admin, other).await;

    let reader = login(&app, "lector", "clave-lector").await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/proyectos", Some(&reader), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 2);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/proyectos?cliente=vialidad", Some(&reader), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["cliente"], "Vialidad");

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/proyectos?estado=Activo", Some(&reader), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["estado"], "Activo");

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/proyectos?estado=Select%20Status",
            Some(&reader),
            None,
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_statistics_and_status_options() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;

    create(&app, &admin, sample_project("Uno")).await;
    let mut pending = sample_project("Dos");
    pending["Estado"] = json!("Pendiente");
    pending["Monto"] = json!(500000);
    create(&app, &admin, pending).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/statistics", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["total_projects"], 2);
    assert_eq!(body["data"]["total_amount"], 2000000.0);
    assert_eq!(body["data"]["average_amount"], 1000000.0);
    assert_eq!(body["data"]["status_breakdown"]["Pendiente"]["count"], 1);

    let response = app
        .oneshot(test_request("GET", "/api/status-options", Some(&admin), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"], json!(["Activo", "Completado", "Pendiente"]));
}

// =============================================================================
// Import and export
// =============================================================================

#[tokio::test]
async fn test_bulk_import_skips_invalid_rows() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;

    let mut bad = sample_project("Monto negativo");
    bad["Monto"] = json!("-5");
    let request = test_request(
        "POST",
        "/api/proyectos/bulk-import",
        Some(&admin),
        Some(json!({"proyectos": [sample_project("Bueno"), bad, sample_project("Otro bueno")]})),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["imported"], 2);
    assert_eq!(body["data"]["rejected"], 1);
    assert_eq!(
        body["message"],
        "Importados 2 proyectos exitosamente (1 filas omitidas)"
    );
    assert_eq!(body["details"][0], "Fila 2: El monto no puede ser negativo");

    let response = app
        .oneshot(test_request("GET", "/api/proyectos", Some(&admin), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_bulk_import_with_no_valid_rows() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;

    let request = test_request(
        "POST",
        "/api/proyectos/bulk-import",
        Some(&admin),
        Some(json!({"proyectos": [{"Contrato": ""}]})),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No hay proyectos válidos para importar");
    assert!(!body["details"].as_array().unwrap().is_empty());

    let request = test_request(
        "POST",
        "/api/proyectos/bulk-import",
        Some(&admin),
        Some(json!({"proyectos": []})),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_csv_with_semicolons() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;

    let csv = "\u{feff}Id;Contrato;Cliente;Región;Ciudad;Estado;Monto;EMS\n\
               1000;Mecánica de Suelos;Depto Educación;La Araucanía;Padre las Casas;Completado;700000;TRUE\n\
               ;Estudio Sísmico;Municipalidad;Maule;Talca;;1200000.50;no\n";
    let request = Request::builder()
        .method("POST")
        .uri("/api/proyectos/import-csv")
        .header(header::COOKIE, &admin)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["imported"], 2);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/proyectos/1001", Some(&admin), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["contrato"], "Estudio Sísmico");
    assert_eq!(body["data"]["estado"], "Activo");
    assert_eq!(body["data"]["monto"], 1200000.5);

    let request = Request::builder()
        .method("POST")
        .uri("/api/proyectos/import-csv")
        .header(header::COOKIE, &admin)
        .body(Body::from("Contrato,Cliente\n"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_csv() {
    let app = setup_app().await;
    let admin = login(&app, "admin", "clave-admin").await;
    create(&app, &admin, sample_project("Mecánica de Suelos")).await;

    let response = app
        .clone()
        .oneshot(test_request(
            "GET",
            "/api/proyectos/export.csv?fields=id,contrato,ems,monto",
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/csv"));
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("proyectos_"));

    let text = extract_text(response.into_body()).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "ID del Proyecto,Contrato,EMS,Monto");
    assert_eq!(lines[1], "1001,Mecánica de Suelos,Sí,1500000");

    let response = app
        .clone()
        .oneshot(test_request(
            "GET",
            "/api/proyectos/export.csv?fields=id,ems&boolean_format=1-0",
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    let text = extract_text(response.into_body()).await;
    assert_eq!(text.lines().nth(1), Some("1001,1"));

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/proyectos/export.csv?fields=desconocido",
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_pages_redirect_by_role() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/", None, None))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    let response = app
        .clone()
        .oneshot(test_request("GET", "/login", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reader = login(&app, "lector", "clave-lector").await;
    let response = app
        .clone()
        .oneshot(test_request("GET", "/", Some(&reader), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/modify-database", Some(&reader), None))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let admin = login(&app, "admin", "clave-admin").await;
    let response = app
        .oneshot(test_request("GET", "/modify-database.html", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_endpoint() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/api/no-existe", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Endpoint no encontrado");
}

// =============================================================================
// Malformed requests
// =============================================================================

async fn assert_bad_request(app: &Router, request: Request<Body>) -> Value {
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
    json
}

#[tokio::test]
async fn test_malformed_json_body_gets_error_envelope() {
    let app = setup_app().await;
    let cookie = login(&app, "admin", "clave-admin").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/proyectos")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"Contrato\": "))
        .unwrap();
    assert_bad_request(&app, request).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    assert_bad_request(&app, request).await;
}

#[tokio::test]
async fn test_bulk_delete_ids_must_be_a_list() {
    let app = setup_app().await;
    let cookie = login(&app, "admin", "clave-admin").await;

    for body in [json!({"ids": "1001"}), json!({"ids": {"a": 1}}), json!({})] {
        let request = test_request("POST", "/api/proyectos/bulk-delete", Some(&cookie), Some(body));
        assert_bad_request(&app, request).await;
    }
}

#[tokio::test]
async fn test_non_numeric_project_id_in_path() {
    let app = setup_app().await;
    let cookie = login(&app, "admin", "clave-admin").await;

    let request = test_request("GET", "/api/proyectos/abc", Some(&cookie), None);
    assert_bad_request(&app, request).await;

    let request = test_request(
        "PUT",
        "/api/proyectos/12x",
        Some(&cookie),
        Some(json!({"estado": "Completado"})),
    );
    assert_bad_request(&app, request).await;
}

#[tokio::test]
async fn test_create_after_largest_id_is_bad_request() {
    let app = setup_app().await;
    let cookie = login(&app, "admin", "clave-admin").await;

    let mut body = sample_project("Tope");
    body["id"] = json!(i64::MAX);
    let json = create(&app, &cookie, body).await;
    assert_eq!(json["data"]["id"], json!(i64::MAX));

    let request = test_request(
        "POST",
        "/api/proyectos",
        Some(&cookie),
        Some(sample_project("Sin id")),
    );
    let json = assert_bad_request(&app, request).await;
    assert!(json["error"].as_str().unwrap().contains("ID máximo"));

    let rows = json!({"proyectos": [sample_project("Importado sin id")]});
    let request = test_request("POST", "/api/proyectos/bulk-import", Some(&cookie), Some(rows));
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = extract_json(response.into_body()).await;
    assert_eq!(json["success"], false);
}
