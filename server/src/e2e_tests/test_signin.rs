//! Sign-in scenarios.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::TestApp;

#[tokio::test]
async fn test_signup_and_signin() {
    let app = TestApp::new();
    app.signup_davide().await;

    let response = app.signin("davide", "davide").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.token().is_empty());
}

#[tokio::test]
async fn test_signin_wrong_password() {
    let app = TestApp::new();
    app.signup_davide().await;

    let response = app.signin("davide", "davide2").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "status": "Invalid password" }));
}

#[tokio::test]
async fn test_signin_unknown_user_matches_wrong_password() {
    let app = TestApp::new();
    app.signup_davide().await;

    let unknown = app.signin("matteo", "davide").await;
    let wrong = app.signin("davide", "nope").await;

    assert_eq!(unknown.status, wrong.status);
    assert_eq!(unknown.body, wrong.body);
}

#[tokio::test]
async fn test_signin_token_resolves_to_user() {
    let app = TestApp::new();
    app.signup_davide().await;

    let signin = app.signin("davide", "davide").await;
    let me = app.me(signin.token()).await;

    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body, json!({ "username": "davide" }));
}
