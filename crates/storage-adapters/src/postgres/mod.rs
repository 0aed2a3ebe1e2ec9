//! # PostgreSQL Adapters
//!
//! One repository per port, all sharing a single `PgPool`. Integrity lives in the
//! schema (see `migrations/`); this module translates constraint violations into
//! `DomainError` variants at the port boundary.

mod accounts;
mod comments;
mod complaints;
mod likes;
mod posts;

pub use accounts::{PgAccountRepo, PgAdminGrantRepo};
pub use comments::PgCommentRepo;
pub use complaints::PgComplaintRepo;
pub use likes::PgLikeRepo;
pub use posts::PgPostRepo;
pub use sqlx::postgres::PgPool;

use std::time::Duration;

use domains::DomainError;
use sqlx::error::ErrorKind;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use crate::messages;

pub async fn connect(url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await?;
    info!(max_connections, "postgres pool ready");
    Ok(pool)
}

/// Applies the embedded migrations from `crates/storage-adapters/migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub(crate) fn map_db_error(err: sqlx::Error) -> DomainError {
    if let Some(db) = err.as_database_error() {
        let constraint = db.constraint().unwrap_or_default();
        match db.kind() {
            ErrorKind::UniqueViolation => {
                let message = match constraint {
                    "accounts_email_key" => messages::EMAIL_TAKEN,
                    "handles_handle_key" => messages::HANDLE_TAKEN,
                    _ => "Already exists",
                };
                return DomainError::Conflict(message.into());
            }
            ErrorKind::ForeignKeyViolation => return DomainError::not_found(missing_parent(constraint)),
            ErrorKind::CheckViolation if constraint == "posts_dates_ordered" => {
                return DomainError::validation("start_date must not be after end_date");
            }
            _ => {}
        }
    }
    error!(error = %err, "database failure");
    DomainError::internal(err.to_string())
}

/// Postgres names foreign keys `<table>_<column>_fkey`.
fn missing_parent(constraint: &str) -> &'static str {
    if constraint.contains("_post_id_") {
        messages::POST_NOT_FOUND
    } else if constraint.contains("_comment_id_") {
        messages::COMMENT_NOT_FOUND
    } else {
        messages::ACCOUNT_NOT_FOUND
    }
}
