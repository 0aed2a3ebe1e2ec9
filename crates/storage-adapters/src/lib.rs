//! # storage-adapters
//!
//! Implementations of the `domains` persistence ports, plus the per-caller
//! login rate limiter.

pub mod memory;
pub mod rate_limit;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;
pub use rate_limit::FixedWindowRateLimiter;

/// Messages shared by every backend so callers see the same text either way.
pub(crate) mod messages {
    pub const EMAIL_TAKEN: &str = "A user with this email already exists.";
    pub const HANDLE_TAKEN: &str = "This username is already taken.";
    pub const POST_NOT_FOUND: &str = "Post not found";
    pub const COMMENT_NOT_FOUND: &str = "Comment not found";
    pub const ACCOUNT_NOT_FOUND: &str = "User not found";
}
