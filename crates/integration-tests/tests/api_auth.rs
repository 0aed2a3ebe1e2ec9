use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use integration_tests::{email_of, TestApp, PASSWORD};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_register_returns_created_user() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "ayse@example.com", "password": PASSWORD, "username": "ayse" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.message(), "User registered successfully");
    assert_eq!(response.body["user"]["email"], "ayse@example.com");
    assert_eq!(response.body["user"]["username"], "ayse");
    assert!(response.body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_conflicts() {
    let app = TestApp::new();
    app.register("ayse").await;

    let same_email = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": email_of("ayse"), "password": PASSWORD, "username": "other" }),
        )
        .await;
    assert_eq!(same_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(same_email.error(), "A user with this email already exists.");

    let same_handle = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "other@example.com", "password": PASSWORD, "username": "ayse" }),
        )
        .await;
    assert_eq!(same_handle.status, StatusCode::BAD_REQUEST);
    assert_eq!(same_handle.error(), "This username is already taken.");

    // the losing registration must not leave an account behind
    let login = app
        .post("/api/auth/login", None, json!({ "email": "other@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(login.error(), "Invalid user");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let missing = app
        .post("/api/auth/register", None, json!({ "email": "ayse@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.error(), "Email, password and username are required");

    let bad_email = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "ayse@localhost", "password": PASSWORD, "username": "ayse" }),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.error(), "Please enter a valid email address.");
}

#[tokio::test]
async fn test_malformed_json_is_a_json_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.error().is_empty());
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new();
    app.register("ayse").await;

    let unknown = app
        .post("/api/auth/login", None, json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.error(), "Invalid user");

    let wrong = app
        .post("/api/auth/login", None, json!({ "email": email_of("ayse"), "password": "nope" }))
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.error(), "Invalid password");

    let empty = app.post("/api/auth/login", None, json!({ "email": email_of("ayse") })).await;
    assert_eq!(empty.error(), "Email and password are required.");
}

#[tokio::test]
async fn test_me_with_token() {
    let app = TestApp::new();
    let session = app.user("ayse").await;

    let response = app.get("/api/auth/me", Some(&session.token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], session.id.to_string());
    assert_eq!(response.body["email"], email_of("ayse"));
    assert_eq!(response.body["username"], "ayse");
    assert!(response.body["created_at"].is_string());
}

#[tokio::test]
async fn test_me_rejects_missing_and_bad_tokens() {
    let app = TestApp::new();
    let session = app.user("ayse").await;

    let missing = app.get("/api/auth/me", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error(), "No token provided");

    let garbage = app.get("/api/auth/me", Some("not-a-jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.error(), "Invalid token");

    let expired = app.get("/api/auth/me", Some(&app.expired_token(session.id, false))).await;
    assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired.error(), "Invalid token");
}

#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let app = TestApp::new();
    let session = app.user("ayse").await;

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("bearer {}", session.token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status, StatusCode::OK);

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Token {}", session.token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_account_is_not_found() {
    let app = TestApp::new();
    let token = app.tokens.issue_at(Uuid::now_v7(), false, chrono::Utc::now().timestamp()).unwrap();

    let response = app.get("/api/auth/me", Some(&token)).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "User not found");
}

#[tokio::test]
async fn test_login_attempts_are_rate_limited_per_peer() {
    let app = TestApp::with_login_limit(2);
    let attempt = json!({ "email": "nobody@example.com", "password": PASSWORD });

    for _ in 0..2 {
        let response = app.post("/api/auth/login", None, attempt.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    let limited = app.post("/api/auth/login", None, attempt.clone()).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.error(), "Too many login attempts. Please try again in 15 minutes.");
    assert!(limited.headers.contains_key(header::RETRY_AFTER));

    // registration shares the bucket
    let register = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "ayse@example.com", "password": PASSWORD, "username": "ayse" }),
        )
        .await;
    assert_eq!(register.status, StatusCode::TOO_MANY_REQUESTS);

    // profile lookups are not limited
    assert_eq!(app.get("/api/auth/me", None).await.status, StatusCode::UNAUTHORIZED);

    let other_peer = app.from_peer(SocketAddr::from(([10, 0, 0, 7], 5000)));
    let response = other_peer.post("/api/auth/login", None, attempt).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();

    let response = app.get("/api/auth/me", None).await;

    assert!(response.headers.contains_key("x-request-id"));
}
