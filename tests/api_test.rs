//! Integration tests for API endpoints.
//!
//! The router runs over the real services backed by repository mocks and a
//! disconnected database handle, so no Postgres is needed.

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use brewmaster::api::{create_router, AppState};
use brewmaster::config::{ROLE_ADMIN, ROLE_CAJERO};
use brewmaster::domain::{Password, Rol};
use brewmaster::errors::AppError;
use brewmaster::infra::repositories::{
    MockAuditoriaRepository, MockBarrilRepository, MockRolRepository, MockUsuarioRepository,
};
use brewmaster::infra::Database;
use brewmaster::services::{Claims, Services};

use common::{barril, test_config, usuario, TestUnitOfWork, TEST_SECRET};

fn app(uow: TestUnitOfWork) -> Router {
    let config = test_config();
    let services = Services::new(uow.into_arc(), config.clone());
    let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));
    create_router(AppState::new(services, database, config.cors_origins))
}

fn token(id: i32, rol: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: id,
        rut: "12345678-5".to_string(),
        rol: rol.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_is_public() {
    let response = app(TestUnitOfWork::new())
        .oneshot(get("/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let response = app(TestUnitOfWork::new())
        .oneshot(get("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = app(TestUnitOfWork::new())
        .oneshot(get("/api-docs/openapi.json", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["info"]["title"], "BrewMaster SIGB");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let response = app(TestUnitOfWork::new())
        .oneshot(get("/api/barriles", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let response = app(TestUnitOfWork::new())
        .oneshot(get("/api/auth/me", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_then_me() {
    let hash = Password::new("secreto123", 4).unwrap().into_string();
    let mut usuarios = MockUsuarioRepository::new();
    let login_hash = hash.clone();
    usuarios
        .expect_find_by_rut()
        .returning(move |_| Ok(Some(usuario(7, ROLE_CAJERO, &login_hash))));
    usuarios
        .expect_find_by_id()
        .returning(move |id| Ok(Some(usuario(id, ROLE_CAJERO, &hash))));

    let mut auditoria = MockAuditoriaRepository::new();
    auditoria
        .expect_registrar_login()
        .withf(|intento| intento.exito && intento.ip.as_deref() == Some("200.1.2.3"))
        .times(1)
        .returning(|_| Ok(()));

    let app = app(
        TestUnitOfWork::new()
            .with_usuarios(usuarios)
            .with_auditoria(auditoria),
    );

    let mut login = post_json(
        "/api/auth/login",
        None,
        json!({"identificador": "12.345.678-5", "password": "secreto123"}),
    );
    login
        .headers_mut()
        .insert("x-forwarded-for", "200.1.2.3".parse().unwrap());
    let response = app.clone().oneshot(login).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let access_token = body["access_token"].as_str().unwrap().to_string();
    assert_eq!(body["usuario"]["id"], 7);
    assert!(body["usuario"].get("password_hash").is_none());

    let response = app
        .oneshot(get("/api/auth/me", Some(&access_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rol"], ROLE_CAJERO);
}

#[tokio::test]
async fn test_login_validation_error_has_details() {
    let response = app(TestUnitOfWork::new())
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({"identificador": "", "password": "x"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["details"]["identificador"].is_array());
}

#[tokio::test]
async fn test_duplicate_user_is_bad_request() {
    let mut usuarios = MockUsuarioRepository::new();
    usuarios
        .expect_create()
        .returning(|_| Err(AppError::duplicate("Ya existe un usuario con ese RUT o email")));

    let mut roles = MockRolRepository::new();
    roles.expect_find_by_id().returning(|id| {
        Ok(Some(Rol {
            id,
            nombre: ROLE_CAJERO.to_string(),
            descripcion: None,
        }))
    });

    let app = app(TestUnitOfWork::new().with_usuarios(usuarios).with_roles(roles));
    let response = app
        .oneshot(post_json(
            "/api/usuarios",
            Some(&token(1, ROLE_ADMIN)),
            json!({
                "rut": "12.345.678-5",
                "nombre": "Camila Rojas",
                "email": "camila@brewmaster.cl",
                "password": "secreto123",
                "rol_id": 2
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Ya existe un usuario con ese RUT o email");
}

#[tokio::test]
async fn test_cashier_cannot_create_roles() {
    let response = app(TestUnitOfWork::new())
        .oneshot(post_json(
            "/api/roles",
            Some(&token(7, ROLE_CAJERO)),
            json!({"nombre": "SUPERVISOR"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sale_line_price_above_bound_is_rejected() {
    let response = app(TestUnitOfWork::new())
        .oneshot(post_json(
            "/api/ventas",
            Some(&token(7, ROLE_CAJERO)),
            json!({
                "metodo_pago": "EFECTIVO",
                "detalles": [
                    {"descripcion": "Schop Stout 500cc", "cantidad": 2, "precio_unitario": 200_000_000i64}
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["details"]["detalles"].is_object());
}

#[tokio::test]
async fn test_sale_list_documents_exclusive_upper_bound() {
    let response = app(TestUnitOfWork::new())
        .oneshot(get("/api-docs/openapi.json", None))
        .await
        .unwrap();
    let body = body_json(response).await;

    let params = body["paths"]["/api/ventas"]["get"]["parameters"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let hasta = params
        .iter()
        .find(|p| p["name"] == "hasta")
        .expect("hasta parameter documented");
    assert!(hasta["description"].as_str().unwrap().contains("exclusive"));
}

#[tokio::test]
async fn test_qr_lookup_and_svg() {
    let mut barriles = MockBarrilRepository::new();
    barriles
        .expect_find_by_codigo()
        .withf(|codigo| codigo.to_string() == "BRL-00000001")
        .returning(|_| Ok(Some(barril(1, 30.0))));
    barriles
        .expect_find_by_id()
        .returning(|id| Ok(Some(barril(id, 30.0))));

    let app = app(TestUnitOfWork::new().with_barriles(barriles));
    let bearer = token(7, ROLE_CAJERO);

    let response = app
        .clone()
        .oneshot(get("/api/barriles/qr/BRL-00000001", Some(&bearer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], 1);

    let response = app
        .oneshot(get("/api/barriles/1/qr", Some(&bearer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/svg+xml"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let svg = tokio_test::assert_ok!(String::from_utf8(bytes.to_vec()));
    assert!(svg.contains("<svg"));
}

#[tokio::test]
async fn test_unknown_qr_code_is_not_found() {
    let mut barriles = MockBarrilRepository::new();
    barriles.expect_find_by_codigo().returning(|_| Ok(None));

    let response = app(TestUnitOfWork::new().with_barriles(barriles))
        .oneshot(get("/api/barriles/qr/BRL-FFFFFFFF", Some(&token(7, ROLE_CAJERO))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
