//! Custom middleware for traffic control and request accounting.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domains::{DomainError, RateDecision};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

pub const RATE_LIMITED_MESSAGE: &str = "Too many login attempts. Please try again in 15 minutes.";

/// Caller key for rate limiting. Requests served without `ConnectInfo` share one bucket.
fn caller_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Applied to register and login only.
pub async fn limit_auth_attempts(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = caller_key(&req);
    match state.login_limiter.hit(&key) {
        RateDecision::Allowed { .. } => next.run(req).await,
        RateDecision::Limited { retry_after_secs } => {
            warn!(caller = %key, path = %req.uri().path(), "auth rate limit exceeded");
            state.metrics.record_rate_limited();
            let mut response = ApiError(DomainError::RateLimited(RATE_LIMITED_MESSAGE.into())).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
            response
        }
    }
}

pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let response = next.run(req).await;
    state.metrics.record_request(method.as_str(), response.status().as_u16());
    response
}
