//! HTTP-level integration tests for `/api/admin/login` and `/api/admin/verify`.

mod common;

use axum::http::StatusCode;
use bizdir_core::seed::SeedCatalog;
use common::{
    admin_token, body_json, build_test_app, get, get_auth, login, post_json, ADMIN_PASSWORD,
    ADMIN_USERNAME,
};
use serde_json::json;

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = build_test_app(SeedCatalog::empty());

    let body = json!({"username": ADMIN_USERNAME, "password": "wrong-password"});
    let response = post_json(&app, "/api/admin/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert!(json.get("data").is_none(), "no token on failure");
}

#[tokio::test]
async fn test_login_with_unknown_user_is_unauthorized() {
    let app = build_test_app(SeedCatalog::empty());
    assert!(login(&app, "nobody", ADMIN_PASSWORD).await.is_none());
}

#[tokio::test]
async fn test_login_with_blank_fields_is_bad_request() {
    let app = build_test_app(SeedCatalog::empty());

    let body = json!({"username": "  ", "password": ""});
    let response = post_json(&app, "/api/admin/login", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_returns_token_and_identity() {
    let app = build_test_app(SeedCatalog::empty());

    let body = json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD});
    let response = post_json(&app, "/api/admin/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Login successful");
    assert!(!json["data"]["token"].as_str().unwrap().is_empty());
    assert_eq!(json["data"]["expires_in"], 3600);
    assert_eq!(json["data"]["user"]["username"], ADMIN_USERNAME);
    assert_eq!(json["data"]["user"]["role"], "admin");
}

#[tokio::test]
async fn test_verify_returns_token_owner() {
    let app = build_test_app(SeedCatalog::empty());
    let token = admin_token(&app).await;

    let response = get_auth(&app, "/api/admin/verify", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], ADMIN_USERNAME);
    assert_eq!(json["data"]["role"], "admin");
}

#[tokio::test]
async fn test_verify_without_header_is_unauthorized() {
    let app = build_test_app(SeedCatalog::empty());

    let response = get(&app, "/api/admin/verify").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_verify_rejects_tampered_token() {
    let app = build_test_app(SeedCatalog::empty());
    let token = admin_token(&app).await;

    let mut tampered = token.clone();
    tampered.push('x');
    let response = get_auth(&app, "/api/admin/verify", &tampered).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(&app, "/api/admin/verify", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
