#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use bizdir_api::app::build_app;
use bizdir_api::auth::jwt::JwtConfig;
use bizdir_api::auth::password::hash_password;
use bizdir_api::config::{AdminCredentials, ServerConfig};
use bizdir_api::state::AppState;
use bizdir_core::seed::SeedCatalog;
use bizdir_db::RecordStore;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";
pub const JWT_SECRET: &str = "integration-test-secret-long-enough";

/// Build a test `ServerConfig` with safe defaults and a known admin password.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        data_dir: PathBuf::from("unused"),
        seed_dir: None,
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            expiry_hours: 1,
        },
        admin: AdminCredentials {
            username: ADMIN_USERNAME.to_string(),
            password_hash: hash_password(ADMIN_PASSWORD).expect("hashing should succeed"),
        },
    }
}

/// Build the full application over an in-memory store with the given seeds.
pub fn build_test_app(seeds: SeedCatalog) -> Router {
    build_test_app_with_store(Arc::new(RecordStore::in_memory()), seeds)
}

/// Build the full application over a caller-supplied store.
pub fn build_test_app_with_store(store: Arc<RecordStore>, seeds: SeedCatalog) -> Router {
    let state = AppState {
        store,
        config: Arc::new(test_config()),
        seeds: Arc::new(seeds),
    };
    build_app(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(app: &Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn put_json_auth(app: &Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some(token)).await
}

/// Send a raw, non-JSON body.
pub async fn post_raw_auth(app: &Router, uri: &str, body: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Log in as the configured admin and return the bearer token.
pub async fn admin_token(app: &Router) -> String {
    login(app, ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .expect("admin login should succeed")
}

/// Attempt a login; `None` when the server refuses it.
pub async fn login(app: &Router, username: &str, password: &str) -> Option<String> {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/admin/login", body).await;
    if !response.status().is_success() {
        return None;
    }
    let json = body_json(response).await;
    json["data"]["token"].as_str().map(str::to_string)
}
