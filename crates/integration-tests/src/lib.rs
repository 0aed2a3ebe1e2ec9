//! # Integration Test Harness
//!
//! [`TestApp`] assembles the full HTTP stack over the in-memory store and drives it
//! with `tower::ServiceExt::oneshot`, so every test sees the real router, extractors,
//! middleware and error mapping without binding a socket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_adapters::{router, AppState, RouterConfig};
use auth_adapters::{Argon2Hasher, JwtTokenCodec};
use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{Days, NaiveDate, Utc};
use secrecy::SecretString;
use serde_json::{json, Value};
use services::{Ports, Services};
use storage_adapters::{FixedWindowRateLimiter, MemoryStore};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-tests-signing-secret-0123456789";
pub const TOKEN_TTL_SECS: i64 = 3600;
pub const PASSWORD: &str = "correct horse battery staple";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON, or the raw text as a JSON string when the body is not JSON
    pub body: Value,
}

impl TestResponse {
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn text(&self) -> &str {
        self.body.as_str().unwrap_or_default()
    }
}

/// A signed-in account.
pub struct Session {
    pub id: Uuid,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: JwtTokenCodec,
    peer: SocketAddr,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_login_limit(1_000)
    }

    pub fn with_login_limit(max_attempts: u32) -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = JwtTokenCodec::new(&SecretString::from(TEST_SECRET.to_owned()), TOKEN_TTL_SECS)
            .expect("test secret is long enough");

        let services = Services::new(Ports {
            accounts: store.clone(),
            admin_grants: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            likes: store.clone(),
            complaints: store.clone(),
            hasher: Arc::new(Argon2Hasher::new()),
            tokens: Arc::new(tokens.clone()),
        });
        let limiter = Arc::new(FixedWindowRateLimiter::new(max_attempts, Duration::from_secs(900)));
        let router = router(AppState::new(services, limiter), &RouterConfig::default());

        Self { router, store, tokens, peer: SocketAddr::from(([127, 0, 0, 1], 40_000)) }
    }

    /// Subsequent requests appear to come from `peer`.
    pub fn from_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = peer;
        self
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("request")).await
    }

    /// Sends a prepared request; the harness only adds the peer address.
    pub async fn send(&self, mut request: Request<Body>) -> TestResponse {
        request.extensions_mut().insert(ConnectInfo(self.peer));
        let response = self.router.clone().oneshot(request).await.expect("response");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn register(&self, username: &str) -> Uuid {
        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({ "email": email_of(username), "password": PASSWORD, "username": username }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "register {username}: {}", response.body);
        response.body["user"]["id"].as_str().and_then(|id| id.parse().ok()).expect("user id")
    }

    pub async fn login(&self, username: &str) -> String {
        let response = self
            .post("/api/auth/login", None, json!({ "email": email_of(username), "password": PASSWORD }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "login {username}: {}", response.body);
        response.body["token"].as_str().expect("token").to_owned()
    }

    pub async fn user(&self, username: &str) -> Session {
        let id = self.register(username).await;
        let token = self.login(username).await;
        Session { id, token }
    }

    /// Registers an account and grants it admin out of band before logging in.
    pub async fn admin(&self, username: &str) -> Session {
        let id = self.register(username).await;
        self.store.set_admin(id, true).expect("grant admin");
        let token = self.login(username).await;
        Session { id, token }
    }

    /// A correctly signed token that expired an hour ago.
    pub fn expired_token(&self, account_id: Uuid, is_admin: bool) -> String {
        let issued_at = Utc::now().timestamp() - 2 * TOKEN_TTL_SECS;
        self.tokens.issue_at(account_id, is_admin, issued_at).expect("token")
    }

    /// Publishes a post running from `starts_in` to `ends_in` days relative to today.
    pub async fn publish(
        &self,
        admin: &Session,
        title: &str,
        bank: &str,
        category: &str,
        starts_in: i64,
        ends_in: i64,
    ) -> Value {
        let response = self
            .post(
                "/api/posts",
                Some(&admin.token),
                json!({
                    "title": title,
                    "content": format!("{title} details"),
                    "bank_name": bank,
                    "category": category,
                    "start_date": day(starts_in).to_string(),
                    "end_date": day(ends_in).to_string(),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "publish {title}: {}", response.body);
        response.body
    }

    pub async fn comment(&self, session: &Session, post_id: &str, content: &str) -> Value {
        let response = self
            .post("/api/comments", Some(&session.token), json!({ "post_id": post_id, "content": content }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "comment: {}", response.body);
        response.body
    }
}

pub fn email_of(username: &str) -> String {
    format!("{username}@example.com")
}

/// Today shifted by `offset` days.
pub fn day(offset: i64) -> NaiveDate {
    let today = Utc::now().date_naive();
    let shift = Days::new(offset.unsigned_abs());
    if offset >= 0 {
        today + shift
    } else {
        today - shift
    }
}

pub fn id_of(value: &Value) -> &str {
    value["id"].as_str().expect("id")
}

pub fn titles(listing: &Value) -> Vec<&str> {
    listing
        .as_array()
        .expect("array")
        .iter()
        .map(|post| post["title"].as_str().expect("title"))
        .collect()
}
