//! Complaints against comments: anyone signed in can file, only admins can see or dismiss.

use std::sync::Arc;

use chrono::Utc;
use domains::{Complaint, ComplaintRepo, DomainError, Identity, Result};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::Admin;
use crate::input::{non_blank, non_empty_text, parse_id};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ComplaintInput {
    pub comment_id: Option<String>,
    pub reason: Option<String>,
}

pub struct ComplaintService {
    complaints: Arc<dyn ComplaintRepo>,
}

impl ComplaintService {
    pub fn new(complaints: Arc<dyn ComplaintRepo>) -> Self {
        Self { complaints }
    }

    pub async fn file(&self, identity: &Identity, input: ComplaintInput) -> Result<Complaint> {
        let (Some(comment_id), Some(reason)) = (
            non_blank(input.comment_id.as_deref()),
            non_empty_text(input.reason.as_deref()),
        ) else {
            return Err(DomainError::validation("comment_id and reason are required"));
        };
        let comment_id = parse_id(&comment_id, "comment_id")?;

        let complaint = self
            .complaints
            .create(Complaint {
                id: Uuid::now_v7(),
                comment_id,
                reporter_id: identity.account_id,
                reason,
                created_at: Utc::now(),
            })
            .await?;
        info!(complaint_id = %complaint.id, comment_id = %comment_id, "complaint filed");
        Ok(complaint)
    }

    pub async fn list(&self, _admin: &Admin) -> Result<Vec<Complaint>> {
        self.complaints.list().await
    }

    pub async fn dismiss(&self, admin: &Admin, id: Uuid) -> Result<()> {
        if !self.complaints.delete(id).await? {
            return Err(DomainError::not_found("Complaint not found"));
        }
        info!(complaint_id = %id, admin_id = %admin.identity().account_id, "complaint dismissed");
        Ok(())
    }
}
