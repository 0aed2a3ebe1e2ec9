//! Post publishing and browsing.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use domains::{DomainError, Post, PostChanges, PostListing, PostRepo, Result};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::access::Admin;
use crate::input::{non_blank, non_empty_text, parse_date};
use crate::post_query::{plan, ListPostsParams};

/// Body of `POST /posts` and `PUT /posts/{id}`. Dates are ignored on update.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub bank_name: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub struct PostService {
    posts: Arc<dyn PostRepo>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepo>) -> Self {
        Self { posts }
    }

    pub async fn list(&self, params: &ListPostsParams, today: NaiveDate) -> Result<Vec<PostListing>> {
        let query = plan(params, today)?;
        debug!(mode = ?query.mode, limit = query.page.limit, offset = query.page.offset, "listing posts");
        self.posts.list(&query).await
    }

    /// Visible regardless of activity state.
    pub async fn get(&self, id: Uuid) -> Result<Post> {
        self.posts.get(id).await?.ok_or_else(not_found)
    }

    pub async fn create(&self, admin: &Admin, input: PostInput) -> Result<Post> {
        let (Some(title), Some(content), Some(start), Some(end)) = (
            non_empty_text(input.title.as_deref()),
            non_empty_text(input.content.as_deref()),
            non_blank(input.start_date.as_deref()),
            non_blank(input.end_date.as_deref()),
        ) else {
            return Err(DomainError::validation(
                "Title, content, start_date and end_date are required",
            ));
        };

        let start_date = parse_date(&start, "start_date")?;
        let end_date = parse_date(&end, "end_date")?;
        if start_date > end_date {
            return Err(DomainError::validation("start_date must not be after end_date"));
        }

        let post = Post {
            id: Uuid::now_v7(),
            title,
            content,
            image_url: non_blank(input.image_url.as_deref()),
            bank_name: non_blank(input.bank_name.as_deref()),
            category: non_blank(input.category.as_deref()),
            start_date,
            end_date,
            created_at: Utc::now(),
        };

        let created = self.posts.create(post).await?;
        info!(post_id = %created.id, admin_id = %admin.identity().account_id, "post published");
        Ok(created)
    }

    pub async fn update(&self, admin: &Admin, id: Uuid, input: PostInput) -> Result<Post> {
        let (Some(title), Some(content)) = (
            non_empty_text(input.title.as_deref()),
            non_empty_text(input.content.as_deref()),
        ) else {
            return Err(DomainError::validation("Title and content are required"));
        };

        let changes = PostChanges {
            title,
            content,
            image_url: non_blank(input.image_url.as_deref()),
            bank_name: non_blank(input.bank_name.as_deref()),
            category: non_blank(input.category.as_deref()),
        };

        let updated = self.posts.update(id, changes).await?.ok_or_else(not_found)?;
        info!(post_id = %id, admin_id = %admin.identity().account_id, "post updated");
        Ok(updated)
    }

    pub async fn delete(&self, admin: &Admin, id: Uuid) -> Result<()> {
        if !self.posts.delete(id).await? {
            return Err(not_found());
        }
        info!(post_id = %id, admin_id = %admin.identity().account_id, "post deleted");
        Ok(())
    }
}

fn not_found() -> DomainError {
    DomainError::not_found("Post not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::admin;
    use domains::{ListingMode, MockPostRepo};
    use mockall::predicate::eq;

    fn input() -> PostInput {
        PostInput {
            title: Some("Market cashback".into()),
            content: Some("Up to 500 TL back".into()),
            bank_name: Some("Garanti".into()),
            category: Some("market".into()),
            start_date: Some("2024-06-01".into()),
            end_date: Some("2024-06-30".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_core_fields() {
        let service = PostService::new(Arc::new(MockPostRepo::new()));
        let err = service
            .create(&admin().await, PostInput { end_date: None, ..input() })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation("Title, content, start_date and end_date are required".into())
        );
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_dates() {
        let service = PostService::new(Arc::new(MockPostRepo::new()));
        let err = service
            .create(
                &admin().await,
                PostInput { start_date: Some("2024-07-01".into()), ..input() },
            )
            .await
            .unwrap_err();
        assert_eq!(err.message(), "start_date must not be after end_date");
    }

    #[tokio::test]
    async fn test_create_keeps_text_as_sent() {
        let mut repo = MockPostRepo::new();
        repo.expect_create()
            .withf(|post| {
                post.title == "  Market cashback "
                    && post.image_url.is_none()
                    && post.end_date == NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
            })
            .times(1)
            .returning(|post| Ok(post));

        let service = PostService::new(Arc::new(repo));
        let post = service
            .create(&admin().await, PostInput { title: Some("  Market cashback ".into()), image_url: Some("".into()), ..input() })
            .await
            .unwrap();
        assert_eq!(post.bank_name.as_deref(), Some("Garanti"));
    }

    #[tokio::test]
    async fn test_get_missing_post() {
        let mut repo = MockPostRepo::new();
        repo.expect_get().returning(|_| Ok(None));
        let service = PostService::new(Arc::new(repo));
        let err = service.get(Uuid::now_v7()).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound("Post not found".into()));
    }

    #[tokio::test]
    async fn test_update_missing_post() {
        let id = Uuid::now_v7();
        let mut repo = MockPostRepo::new();
        repo.expect_update().with(eq(id), mockall::predicate::always()).returning(|_, _| Ok(None));
        let service = PostService::new(Arc::new(repo));
        let err = service.update(&admin().await, id, input()).await.unwrap_err();
        assert_eq!(err.message(), "Post not found");
    }

    #[tokio::test]
    async fn test_delete_missing_post() {
        let mut repo = MockPostRepo::new();
        repo.expect_delete().returning(|_| Ok(false));
        let service = PostService::new(Arc::new(repo));
        assert!(matches!(
            service.delete(&admin().await, Uuid::now_v7()).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_passes_planned_query() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let mut repo = MockPostRepo::new();
        repo.expect_list()
            .withf(move |query| {
                query.today == today
                    && matches!(&query.mode, ListingMode::Filtered(f) if f.categories == vec!["market"])
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = PostService::new(Arc::new(repo));
        let params = ListPostsParams { category: Some("market".into()), ..Default::default() };
        assert!(service.list(&params, today).await.unwrap().is_empty());
    }
}
