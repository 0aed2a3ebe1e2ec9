//! Admin moderation: account blocking and forced comment removal.

use std::sync::Arc;

use domains::{AccountRepo, Comment, CommentRepo, DomainError, Profile, Result};
use tracing::info;
use uuid::Uuid;

use crate::access::Admin;

pub struct ModerationService {
    accounts: Arc<dyn AccountRepo>,
    comments: Arc<dyn CommentRepo>,
}

impl ModerationService {
    pub fn new(accounts: Arc<dyn AccountRepo>, comments: Arc<dyn CommentRepo>) -> Self {
        Self { accounts, comments }
    }

    pub async fn set_blocked(&self, admin: &Admin, account_id: Uuid, blocked: bool) -> Result<Profile> {
        let profile = self
            .accounts
            .set_blocked(account_id, blocked)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;
        info!(
            account_id = %account_id,
            blocked,
            admin_id = %admin.identity().account_id,
            "account block state changed"
        );
        Ok(profile)
    }

    /// Deletes any comment regardless of its author.
    pub async fn remove_comment(&self, admin: &Admin, comment_id: Uuid) -> Result<Comment> {
        let comment = self
            .comments
            .delete_any(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment not found"))?;
        info!(comment_id = %comment_id, admin_id = %admin.identity().account_id, "comment removed by moderator");
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::admin;
    use chrono::Utc;
    use domains::{MockAccountRepo, MockCommentRepo};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_block_unknown_account() {
        let mut accounts = MockAccountRepo::new();
        accounts.expect_set_blocked().returning(|_, _| Ok(None));
        let service = ModerationService::new(Arc::new(accounts), Arc::new(MockCommentRepo::new()));
        let err = service.set_blocked(&admin().await, Uuid::now_v7(), true).await.unwrap_err();
        assert_eq!(err.message(), "User not found");
    }

    #[tokio::test]
    async fn test_unblock_passes_flag() {
        let id = Uuid::now_v7();
        let mut accounts = MockAccountRepo::new();
        accounts.expect_set_blocked().with(eq(id), eq(false)).times(1).returning(|id, blocked| {
            Ok(Some(Profile {
                id,
                email: "zeynep@example.com".into(),
                username: None,
                is_blocked: blocked,
                created_at: Utc::now(),
            }))
        });
        let service = ModerationService::new(Arc::new(accounts), Arc::new(MockCommentRepo::new()));
        let profile = service.set_blocked(&admin().await, id, false).await.unwrap();
        assert!(!profile.is_blocked);
    }

    #[tokio::test]
    async fn test_remove_missing_comment() {
        let mut comments = MockCommentRepo::new();
        comments.expect_delete_any().returning(|_| Ok(None));
        let service = ModerationService::new(Arc::new(MockAccountRepo::new()), Arc::new(comments));
        assert!(matches!(
            service.remove_comment(&admin().await, Uuid::now_v7()).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
