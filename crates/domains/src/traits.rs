//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Store-backed ports are async; hashing, tokens and rate limiting are CPU-only and sync.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Account, Comment, CommentView, Complaint, Like, LikeSubject, NewAccount, Post, PostChanges,
    PostListing, PostQuery, Profile, RateDecision, TokenClaims,
};

/// Account and handle persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AccountRepo: Send + Sync {
    /// Inserts the account and its handle atomically.
    /// Fails with `Conflict` if either the email or the handle is taken; nothing is persisted then.
    async fn create_with_handle(&self, account: NewAccount) -> Result<Profile>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>>;
    /// Returns the updated profile, or `None` if no such account exists.
    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<Option<Profile>>;
}

/// Read-only view of the admin grants table.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AdminGrantRepo: Send + Sync {
    /// True only if a grant row exists and its flag is set.
    async fn is_admin(&self, account_id: Uuid) -> Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn list(&self, query: &PostQuery) -> Result<Vec<PostListing>>;
    async fn get(&self, id: Uuid) -> Result<Option<Post>>;
    async fn create(&self, post: Post) -> Result<Post>;
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>>;
    /// Returns false if nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// Newest first. `viewer` drives the per-row `liked` flag.
    async fn list_for_post(&self, post_id: Uuid, viewer: Option<Uuid>) -> Result<Vec<CommentView>>;
    /// Fails with `NotFound` if the post does not exist.
    async fn create(&self, comment: Comment) -> Result<CommentView>;
    /// Only matches a comment written by `author_id`.
    async fn update_owned(&self, id: Uuid, author_id: Uuid, content: String) -> Result<Option<Comment>>;
    /// Only matches a comment written by `author_id`.
    async fn delete_owned(&self, id: Uuid, author_id: Uuid) -> Result<bool>;
    /// Moderation path: deletes regardless of author.
    async fn delete_any(&self, id: Uuid) -> Result<Option<Comment>>;
}

/// Post likes and comment likes share one relation shape.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LikeRepo: Send + Sync {
    /// Single conditional insert. `Ok(None)` means the pair already existed,
    /// including when a concurrent insert won the race.
    /// Fails with `NotFound` if the subject does not exist.
    async fn insert_if_absent(&self, like: Like) -> Result<Option<Like>>;
    /// Returns false if the caller had no like on the subject.
    async fn delete(&self, subject: LikeSubject, account_id: Uuid) -> Result<bool>;
    async fn count(&self, subject: LikeSubject) -> Result<i64>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ComplaintRepo: Send + Sync {
    /// Fails with `NotFound` if the comment does not exist.
    async fn create(&self, complaint: Complaint) -> Result<Complaint>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Complaint>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// One-way password hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Signs and verifies session tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenCodec: Send + Sync {
    fn issue(&self, account_id: Uuid, is_admin: bool) -> Result<String>;
    /// Fails with `Unauthenticated` on a bad signature, malformed token or expiry.
    fn verify(&self, token: &str) -> Result<TokenClaims>;
}

/// Counts attempts per caller key.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RateLimiter: Send + Sync {
    fn hit(&self, key: &str) -> RateDecision;
}
