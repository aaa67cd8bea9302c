//! Session lookup scenarios.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::TestApp;
use crate::testing::test_token_service;

#[tokio::test]
async fn test_signup_and_use_token() {
    let app = TestApp::new();
    let token = app.signup_davide().await;

    let response = app.me(&token).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "username": "davide" }));
}

#[tokio::test]
async fn test_me_without_authorization() {
    let app = TestApp::new();

    let response = app.get("/me", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["message"],
        "No Authorization was found in request.headers"
    );
}

#[tokio::test]
async fn test_me_with_wrong_scheme() {
    let app = TestApp::new();
    let token = app.signup_davide().await;

    let response = app.get("/me", Some(&format!("Basic {token}"))).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["message"],
        "Format is Authorization: Bearer [token]"
    );
}

#[tokio::test]
async fn test_me_with_garbled_token() {
    let app = TestApp::new();
    let token = app.signup_davide().await;
    let garbled = format!("{token}x");

    let response = app.me(&garbled).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["statusCode"], 401);
    assert_eq!(response.body["error"], "Unauthorized");
    assert_eq!(response.body["message"], "Authorization token is invalid");
}

#[tokio::test]
async fn test_me_with_token_for_unregistered_user() {
    let app = TestApp::new();
    let token = test_token_service().issue("ghost").unwrap();

    let response = app.me(&token).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Authorization token is invalid");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();

    let response = app.get("/nope", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Route GET:/nope not found");
}

#[tokio::test]
async fn test_wrong_method_is_json_not_found() {
    let app = TestApp::new();

    let response = app.get("/signup", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["statusCode"], 404);
    assert_eq!(response.body["message"], "Route GET:/signup not found");

    let response = app.post("/me", &json!({})).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Route POST:/me not found");
}
