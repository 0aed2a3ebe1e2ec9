//! # api-adapters
//!
//! The HTTP surface of the promotion board. Handlers translate requests into
//! `services` calls and `DomainError`s into JSON error bodies; nothing here
//! touches storage directly.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
mod router;
#[cfg(feature = "web-axum")]
mod state;

pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "web-axum")]
pub use router::{router, RouterConfig};
#[cfg(feature = "web-axum")]
pub use state::AppState;
