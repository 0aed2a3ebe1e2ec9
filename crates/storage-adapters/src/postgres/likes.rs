use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Like, LikeRepo, LikeSubject, Result};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_db_error;

/// (table, subject column) for each kind of like.
fn relation(subject: LikeSubject) -> (&'static str, &'static str) {
    match subject {
        LikeSubject::Post(_) => ("post_likes", "post_id"),
        LikeSubject::Comment(_) => ("comment_likes", "comment_id"),
    }
}

#[derive(Clone)]
pub struct PgLikeRepo {
    pool: PgPool,
}

impl PgLikeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepo for PgLikeRepo {
    async fn insert_if_absent(&self, like: Like) -> Result<Option<Like>> {
        let (table, column) = relation(like.subject);
        let inserted = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(&format!(
            "INSERT INTO {table} (id, {column}, account_id, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT ({column}, account_id) DO NOTHING \
             RETURNING id, created_at"
        ))
        .bind(like.id)
        .bind(like.subject.id())
        .bind(like.account_id)
        .bind(like.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(inserted.map(|(id, created_at)| Like { id, created_at, ..like }))
    }

    async fn delete(&self, subject: LikeSubject, account_id: Uuid) -> Result<bool> {
        let (table, column) = relation(subject);
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE {column} = $1 AND account_id = $2"))
            .bind(subject.id())
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, subject: LikeSubject) -> Result<i64> {
        let (table, column) = relation(subject);
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table} WHERE {column} = $1"))
            .bind(subject.id())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
