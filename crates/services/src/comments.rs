//! Comments on posts. Edits and deletes are scoped to the author; a non-author simply
//! finds no row (404), never a 403.

use std::sync::Arc;

use chrono::Utc;
use domains::{AccountRepo, Comment, CommentRepo, CommentView, DomainError, Identity, Result};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::input::{non_blank, non_empty_text, parse_id};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CommentInput {
    pub post_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CommentEdit {
    pub content: Option<String>,
}

pub struct CommentService {
    comments: Arc<dyn CommentRepo>,
    accounts: Arc<dyn AccountRepo>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepo>, accounts: Arc<dyn AccountRepo>) -> Self {
        Self { comments, accounts }
    }

    pub async fn list(&self, post_id: Uuid, viewer: Option<&Identity>) -> Result<Vec<CommentView>> {
        self.comments
            .list_for_post(post_id, viewer.map(|who| who.account_id))
            .await
    }

    pub async fn create(&self, identity: &Identity, input: CommentInput) -> Result<CommentView> {
        let (Some(post_id), Some(content)) = (
            non_blank(input.post_id.as_deref()),
            non_empty_text(input.content.as_deref()),
        ) else {
            return Err(DomainError::validation("post_id and content are required"));
        };
        let post_id = parse_id(&post_id, "post_id")?;

        let author = self
            .accounts
            .find_profile(identity.account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;
        if author.is_blocked {
            return Err(DomainError::Forbidden("Your account is blocked from commenting".into()));
        }

        self.comments
            .create(Comment {
                id: Uuid::now_v7(),
                post_id,
                author_id: identity.account_id,
                content,
                created_at: Utc::now(),
            })
            .await
    }

    pub async fn edit(&self, identity: &Identity, id: Uuid, input: CommentEdit) -> Result<Comment> {
        let content = non_empty_text(input.content.as_deref())
            .ok_or_else(|| DomainError::validation("Content is required"))?;

        self.comments
            .update_owned(id, identity.account_id, content)
            .await?
            .ok_or_else(not_found_or_not_owner)
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<()> {
        if !self.comments.delete_owned(id, identity.account_id).await? {
            return Err(not_found_or_not_owner());
        }
        info!(comment_id = %id, account_id = %identity.account_id, "comment deleted by author");
        Ok(())
    }
}

fn not_found_or_not_owner() -> DomainError {
    DomainError::not_found("Comment not found or not authorized")
}
