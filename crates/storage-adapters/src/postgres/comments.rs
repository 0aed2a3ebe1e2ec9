use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Comment, CommentRepo, CommentView, Result};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::map_db_error;

const COMMENT_COLUMNS: &str = "id, post_id, account_id AS author_id, content, created_at";

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct CommentViewRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    username: Option<String>,
    like_count: i64,
    liked: bool,
}

impl From<CommentViewRow> for CommentView {
    fn from(row: CommentViewRow) -> Self {
        CommentView {
            comment: row.comment.into(),
            username: row.username,
            like_count: row.like_count,
            liked: row.liked,
        }
    }
}

#[derive(Clone)]
pub struct PgCommentRepo {
    pool: PgPool,
}

impl PgCommentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepo for PgCommentRepo {
    async fn list_for_post(&self, post_id: Uuid, viewer: Option<Uuid>) -> Result<Vec<CommentView>> {
        // A NULL viewer never equals any account_id, so anonymous callers get liked = false.
        let rows = sqlx::query_as::<_, CommentViewRow>(
            "SELECT c.id, c.post_id, c.account_id AS author_id, c.content, c.created_at, \
                    h.handle AS username, \
                    (SELECT COUNT(*) FROM comment_likes cl WHERE cl.comment_id = c.id) AS like_count, \
                    EXISTS (SELECT 1 FROM comment_likes cl \
                            WHERE cl.comment_id = c.id AND cl.account_id = $2) AS liked \
             FROM comments c LEFT JOIN handles h ON h.account_id = c.account_id \
             WHERE c.post_id = $1 \
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(post_id)
        .bind(viewer)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, comment: Comment) -> Result<CommentView> {
        let row = sqlx::query_as::<_, CommentViewRow>(
            "WITH inserted AS ( \
                 INSERT INTO comments (id, post_id, account_id, content, created_at) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING * \
             ) \
             SELECT i.id, i.post_id, i.account_id AS author_id, i.content, i.created_at, \
                    h.handle AS username, 0::BIGINT AS like_count, FALSE AS liked \
             FROM inserted i LEFT JOIN handles h ON h.account_id = i.account_id",
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.content)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.into())
    }

    async fn update_owned(&self, id: Uuid, author_id: Uuid, content: String) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "UPDATE comments SET content = $3 WHERE id = $1 AND account_id = $2 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(author_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete_owned(&self, id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_any(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "DELETE FROM comments WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }
}
