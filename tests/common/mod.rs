//! Shared fixtures for the integration suites
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use hmac::{Hmac, Mac};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use sha2::Sha256;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::util::ServiceExt;

use modastyle_server::core::{Config, ServerState, build_app};
use modastyle_server::db::models::{CategoryCreate, ProductCreate, VariantCreate};
use modastyle_server::db::repository::{CategoryRepository, ProductRepository};
use modastyle_server::db::{DbService, ensure_admin_user};
use modastyle_server::payments::MockGateway;
use modastyle_server::services::LogMailer;

pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";
pub const ADMIN_EMAIL: &str = "admin@modastyle.test";
pub const ADMIN_PASSWORD: &str = "segura123";

/// In-memory server state with the mock gateway and log mailer
pub async fn test_state() -> ServerState {
    let config = Config::for_tests();
    let db = DbService::open_in_memory().await.expect("in-memory db");
    ensure_admin_user(&db.pool, &config.admin_email, &config.admin_password)
        .await
        .expect("bootstrap admin");

    ServerState::new(config, db.pool, Arc::new(MockGateway), Arc::new(LogMailer))
}

pub fn app(state: &ServerState) -> Router {
    build_app(state.clone())
}

/// Seed a category plus one product (stock 5, precio 25990, one M/Negro
/// variant with stock 4). Returns (categoria_id, producto_id, variante_id).
pub async fn seed_catalog(pool: &SqlitePool) -> (String, String, String) {
    let categoria = CategoryRepository::new(pool.clone())
        .create(CategoryCreate {
            nombre: "Camisetas".to_string(),
            slug: None,
            descripcion: None,
            imagen: None,
            orden: 0,
            activo: true,
        })
        .await
        .expect("seed category");

    let products = ProductRepository::new(pool.clone());
    let producto = products
        .create(ProductCreate {
            nombre: "Camiseta Básica".to_string(),
            descripcion_corta: "Camiseta de algodón premium".to_string(),
            descripcion_larga: None,
            precio: 25990,
            precio_original: Some(39990),
            categoria_id: categoria.id.clone(),
            sku: "SKU-001".to_string(),
            stock: 5,
            stock_minimo: 10,
            imagenes: vec![],
            tallas: vec!["M".to_string()],
            colores: vec!["Negro".to_string()],
            tags: vec![],
            destacado: true,
            activo: true,
            variantes: vec![VariantCreate {
                talla: "M".to_string(),
                color: "Negro".to_string(),
                stock: 4,
                precio: None,
                sku: "SKU-001-M-N".to_string(),
            }],
        })
        .await
        .expect("seed product");

    let variante = products
        .variants_for(&producto.id)
        .await
        .expect("variants")
        .remove(0);

    (categoria.id, producto.id, variante.id)
}

/// Drive one request through the router and decode the JSON body.
pub async fn send(
    app: Router,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn post_json_with_token(uri: &str, body: &serde_json::Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn put_json_with_token(uri: &str, body: &serde_json::Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn delete_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

/// Signed webhook delivery in the gateway's `t=..,v1=..` format
pub fn signed_webhook(uri: &str, payload: &serde_json::Value, secret: &str) -> Request<Body> {
    let body = payload.to_string();
    let timestamp = chrono::Utc::now().timestamp();

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("stripe-signature", format!("t={timestamp},v1={signature}"))
        .body(Body::from(body))
        .expect("request")
}

/// Log in as the bootstrap admin and return the bearer token
pub async fn admin_token(state: &ServerState) -> String {
    let (status, body) = send(
        app(state),
        post_json(
            "/api/auth/login",
            &serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

pub async fn product_stock(pool: &SqlitePool, id: &str) -> i64 {
    sqlx::query_scalar("SELECT stock FROM productos WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("stock")
}
