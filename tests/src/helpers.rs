use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use app_config::{AppConfig, Argon2Config};
use app_database::db_connect::initialize_memory_db;
use fundraiser_api::{routes::create_routes, state::AppState};

/// A fresh app over a fresh in-memory database. Every test gets its own
/// instance, so rate-limiter and database state never leak between tests.
pub async fn test_app() -> Router {
    test_app_with(|_| {}).await
}

pub async fn test_app_with(tweak: impl FnOnce(&mut AppConfig)) -> Router {
    let mut config = AppConfig::default();
    // Small hashing cost keeps the suite fast.
    config.security.password.argon2 = Argon2Config {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
    };
    tweak(&mut config);

    let db = initialize_memory_db().await.expect("memory db");
    create_routes(AppState::new(config, db))
}

pub async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_json_with_token(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_form(app: &Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn delete(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn register_payload(username: &str, email: &str) -> Value {
    json!({
        "email": email,
        "username": username,
        "password": "SecurePass123",
        "full_name": "Test User"
    })
}

/// Register a user and log in, returning the bearer token.
pub async fn register_and_login(app: &Router, username: &str, email: &str) -> String {
    let response = send_json(
        app,
        "POST",
        "/auth/register",
        register_payload(username, email),
    )
    .await;
    assert_eq!(response.status(), 201, "registration should succeed");

    let response = post_form(
        app,
        "/auth/login",
        &format!("username={}&password=SecurePass123", username),
    )
    .await;
    assert_eq!(response.status(), 200, "login should succeed");

    let body = body_json(response).await;
    body["access_token"].as_str().unwrap().to_string()
}
