//! Concurrent signups for one username: exactly one wins.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::e2e_tests::helpers::TestApp;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signup_same_username() {
    let app = Arc::new(TestApp::new());

    let handles = (0..10).map(|i| {
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            app.signup(&format!("attempt {i}"), "davide", "davide")
                .await
        })
    });
    let responses: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    let ok = responses
        .iter()
        .filter(|r| r.status == StatusCode::OK)
        .count();
    let taken = responses
        .iter()
        .filter(|r| {
            r.status == StatusCode::BAD_REQUEST
                && r.body["message"] == "username already registered"
        })
        .count();

    assert_eq!(ok, 1);
    assert_eq!(taken, 9);
    assert_eq!(app.store.len().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signup_different_usernames() {
    let app = Arc::new(TestApp::new());

    let handles = (0..10).map(|i| {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.signup("someone", &format!("user{i}"), "pw").await })
    });
    for response in futures::future::join_all(handles).await {
        assert_eq!(response.unwrap().status, StatusCode::OK);
    }

    assert_eq!(app.store.len().unwrap(), 10);
}
