//! # Domain Models
//!
//! These structs represent the core entities of the promotion board.
//! Identifiers are UUID v7 so they sort by creation time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. The password hash never leaves the storage and auth layers.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    /// PHC-formatted Argon2id hash
    pub password_hash: String,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to create an Account and claim its Handle in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub handle: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of an account joined with its handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

/// The caller, as established by a verified token. Carries no privilege information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub account_id: Uuid,
}

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub account_id: Uuid,
    /// Snapshot taken at login, for client-side rendering only
    pub is_admin: bool,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// A time-bound bank promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub bank_name: Option<String>,
    pub category: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// A post stays active through the whole of its end date.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.end_date >= today
    }

    pub fn remaining_days(&self, today: NaiveDate) -> i32 {
        (self.end_date - today).num_days() as i32
    }
}

/// Editable fields of a post. Dates are fixed once published.
#[derive(Debug, Clone, PartialEq)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub bank_name: Option<String>,
    pub category: Option<String>,
}

/// A post row as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostListing {
    #[serde(flatten)]
    pub post: Post,
    /// `None` for expired posts in the unfiltered listing
    pub remaining_days: Option<i32>,
}

/// Narrowing criteria. Every populated field is ANDed with the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilters {
    pub banks: Vec<String>,
    pub categories: Vec<String>,
    pub search: Option<String>,
}

impl PostFilters {
    pub fn is_empty(&self) -> bool {
        self.banks.is_empty() && self.categories.is_empty() && self.search.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingMode {
    /// Active posts only, soonest-to-expire first.
    Filtered(PostFilters),
    /// Active posts (soonest-to-expire first) followed by expired posts (most recent first).
    Unfiltered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: 10, offset: 0 }
    }
}

/// A fully planned listing request. `today` is captured once so every predicate agrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub mode: ListingMode,
    pub today: NaiveDate,
    pub page: Page,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    #[serde(rename = "user_id")]
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment enriched with its author's handle and engagement state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub username: Option<String>,
    pub like_count: i64,
    /// Always false for anonymous callers
    pub liked: bool,
}

/// What a like points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LikeSubject {
    #[serde(rename = "post_id")]
    Post(Uuid),
    #[serde(rename = "comment_id")]
    Comment(Uuid),
}

impl LikeSubject {
    pub fn id(&self) -> Uuid {
        match self {
            LikeSubject::Post(id) | LikeSubject::Comment(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LikeSubject::Post(_) => "Post",
            LikeSubject::Comment(_) => "Comment",
        }
    }
}

/// At most one exists per (subject, account) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Like {
    pub id: Uuid,
    #[serde(flatten)]
    pub subject: LikeSubject,
    #[serde(rename = "user_id")]
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A report against a comment, triaged by admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    pub comment_id: Uuid,
    #[serde(rename = "user_id")]
    pub reporter_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of counting one attempt against a rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}
