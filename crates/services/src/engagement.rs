//! # Engagement Counters
//!
//! Likes on posts and comments. The (subject, account) pair is unique; creation is a
//! single conditional insert so a concurrent duplicate reads exactly like a normal one.

use std::sync::Arc;

use chrono::Utc;
use domains::{DomainError, Identity, Like, LikeRepo, LikeSubject, Result};
use tracing::debug;
use uuid::Uuid;

pub struct EngagementService {
    likes: Arc<dyn LikeRepo>,
}

impl EngagementService {
    pub fn new(likes: Arc<dyn LikeRepo>) -> Self {
        Self { likes }
    }

    pub async fn like(&self, identity: &Identity, subject: LikeSubject) -> Result<Like> {
        let like = Like {
            id: Uuid::now_v7(),
            subject,
            account_id: identity.account_id,
            created_at: Utc::now(),
        };

        match self.likes.insert_if_absent(like).await? {
            Some(created) => Ok(created),
            None => {
                debug!(subject = ?subject, account_id = %identity.account_id, "duplicate like");
                Err(DomainError::Conflict("Already liked".into()))
            }
        }
    }

    pub async fn unlike(&self, identity: &Identity, subject: LikeSubject) -> Result<()> {
        if self.likes.delete(subject, identity.account_id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("Like not found"))
        }
    }

    /// Public; no identity required.
    pub async fn count(&self, subject: LikeSubject) -> Result<i64> {
        self.likes.count(subject).await
    }
}
