use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domains::DomainError;
use serde_json::json;

use crate::error::ApiError;
use crate::metrics::CONTENT_TYPE as OPENMETRICS;
use crate::state::AppState;

pub const NOT_FOUND_MESSAGE: &str = "404 - The page you are looking for was not found!";

pub async fn index() -> &'static str {
    "Promo Board backend is running!"
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => ([(CONTENT_TYPE, OPENMETRICS)], body).into_response(),
        Err(e) => ApiError(DomainError::internal(format!("failed to encode metrics: {e}"))).into_response(),
    }
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": NOT_FOUND_MESSAGE })))
}
