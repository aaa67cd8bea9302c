//! Test that bodies missing required fields are rejected before any flow runs.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::e2e_tests::helpers::TestApp;

fn assert_bad_request(body: &Value, message: &str) {
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], message);
}

#[tokio::test]
async fn test_signup_without_password() {
    let app = TestApp::new();

    let response = app
        .post("/signup", &json!({ "fullName": "davide", "username": "davide" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_bad_request(
        &response.body,
        "body should have required property 'password'",
    );
    assert!(app.store.is_empty().unwrap());
}

#[tokio::test]
async fn test_signup_without_username() {
    let app = TestApp::new();

    let response = app
        .post("/signup", &json!({ "fullName": "dddddd", "password": "aaaaa" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_bad_request(
        &response.body,
        "body should have required property 'username'",
    );
}

#[tokio::test]
async fn test_signup_without_full_name() {
    let app = TestApp::new();

    let response = app
        .post("/signup", &json!({ "username": "dddddd", "password": "aaaaa" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_bad_request(
        &response.body,
        "body should have required property 'fullName'",
    );
}

#[tokio::test]
async fn test_signin_without_password() {
    let app = TestApp::new();

    let response = app.post("/signin", &json!({ "username": "davide" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_bad_request(
        &response.body,
        "body should have required property 'password'",
    );
}

#[tokio::test]
async fn test_signin_without_username() {
    let app = TestApp::new();

    let response = app.post("/signin", &json!({ "password": "aaaaa" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_bad_request(
        &response.body,
        "body should have required property 'username'",
    );
}

#[tokio::test]
async fn test_wrong_field_type() {
    let app = TestApp::new();

    let response = app
        .post("/signin", &json!({ "username": 42, "password": "aaaaa" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_bad_request(&response.body, "body.username should be string");
}

#[tokio::test]
async fn test_unparsable_body() {
    let app = TestApp::new();

    let response = app.post_raw("/signup", "{\"username\":").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["statusCode"], 400);
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .starts_with("body is not valid JSON")
    );
}
