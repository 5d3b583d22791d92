//! Store failures, health checks and response headers.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};

use openwaitlist_integration_tests::{Credentials, TestApp};

#[tokio::test]
async fn test_health_is_independent_of_store() {
    let app = TestApp::new();
    app.store.set_available(false);

    let response = app
        .request(Method::GET, "/health", None, &Credentials::Anonymous)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_readiness_follows_store() {
    let app = TestApp::new();

    let ready = app
        .request(Method::GET, "/health/ready", None, &Credentials::Anonymous)
        .await;
    assert_eq!(ready.status, StatusCode::OK);

    app.store.set_available(false);
    let not_ready = app
        .request(Method::GET, "/health/ready", None, &Credentials::Anonymous)
        .await;
    assert_eq!(not_ready.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_store_failure_returns_generic_error() {
    let app = TestApp::new();
    let alice = app.bearer_user("alice@example.com").await;
    app.store.set_available(false);

    let response = app.request(Method::GET, "/waitlists", None, &alice).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "Internal server error");
}

#[tokio::test]
async fn test_signup_fails_cleanly_when_store_down() {
    let app = TestApp::new();
    app.store.set_available(false);

    let response = app.signup("alice@example.com", "password").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["message"], "Internal server error");
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/health", None, &Credentials::Anonymous)
        .await;

    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(response.headers.get("x-frame-options").unwrap(), "DENY");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/nope", None, &Credentials::Anonymous)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
