use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Complaint, ComplaintRepo, Result};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::map_db_error;

#[derive(FromRow)]
struct ComplaintRow {
    id: Uuid,
    comment_id: Uuid,
    reporter_id: Uuid,
    reason: String,
    created_at: DateTime<Utc>,
}

impl From<ComplaintRow> for Complaint {
    fn from(row: ComplaintRow) -> Self {
        Complaint {
            id: row.id,
            comment_id: row.comment_id,
            reporter_id: row.reporter_id,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgComplaintRepo {
    pool: PgPool,
}

impl PgComplaintRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ComplaintRepo for PgComplaintRepo {
    async fn create(&self, complaint: Complaint) -> Result<Complaint> {
        let row = sqlx::query_as::<_, ComplaintRow>(
            "INSERT INTO complaints (id, comment_id, reporter_id, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, comment_id, reporter_id, reason, created_at",
        )
        .bind(complaint.id)
        .bind(complaint.comment_id)
        .bind(complaint.reporter_id)
        .bind(complaint.reason)
        .bind(complaint.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Complaint>> {
        let rows = sqlx::query_as::<_, ComplaintRow>(
            "SELECT id, comment_id, reporter_id, reason, created_at FROM complaints \
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }
}
