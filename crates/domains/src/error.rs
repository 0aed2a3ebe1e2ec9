//! # DomainError
//!
//! Centralized error handling for the promotion board.
//! Every adapter converts its own failures into one of these variants at the port boundary.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing or malformed input (e.g., absent title, bad date, negative offset)
    #[error("validation error: {0}")]
    Validation(String),

    /// No usable credentials (missing, invalid or expired token)
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid identity, insufficient privilege or a blocked account
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (e.g., Post, Comment, Like)
    #[error("not found: {0}")]
    NotFound(String),

    /// Unique relation already exists (e.g., duplicate like or email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded
    #[error("too many requests: {0}")]
    RateLimited(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// The caller-facing message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(m)
            | DomainError::Unauthenticated(m)
            | DomainError::Forbidden(m)
            | DomainError::NotFound(m)
            | DomainError::Conflict(m)
            | DomainError::RateLimited(m)
            | DomainError::Internal(m) => m,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// A specialized Result type for promotion board logic.
pub type Result<T> = std::result::Result<T, DomainError>;
