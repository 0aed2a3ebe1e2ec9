//! # Handlers
//!
//! One module per resource. Path identifiers arrive as strings and are parsed
//! here so a malformed id is a 400 with the usual error body.

pub mod auth;
pub mod comments;
pub mod complaints;
pub mod likes;
pub mod moderation;
pub mod posts;
pub mod system;

use axum::Json;
use domains::{DomainError, Result};
use serde::Serialize;
use services::input::{non_blank, parse_id};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

pub(crate) fn message(message: &'static str) -> Json<MessageBody> {
    Json(MessageBody { message })
}

pub(crate) fn path_id(raw: &str) -> Result<Uuid> {
    parse_id(raw, "id")
}

/// For `?post_id=` style selectors on list and delete routes.
pub(crate) fn query_id(raw: Option<&str>, field: &str) -> Result<Uuid> {
    let value = non_blank(raw)
        .ok_or_else(|| DomainError::validation(format!("{field} query parameter is required")))?;
    parse_id(&value, field)
}
