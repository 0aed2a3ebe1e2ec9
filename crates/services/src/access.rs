//! # Access Control
//!
//! The one Credential Verifier and Privilege Checker pair behind every route.
//!
//! Verification only establishes *who* the caller is. Privilege is re-derived from
//! the admin grants table on every privileged request; the `is_admin` snapshot
//! embedded in the token is never consulted here, so a revoked grant takes effect
//! immediately instead of at token expiry.

use std::sync::Arc;

use domains::{AdminGrantRepo, DomainError, Identity, Result, TokenCodec};
use tracing::warn;

/// Proof that the Privilege Checker approved the caller for this request.
///
/// Only [`AccessControl::require_admin`] can produce one, so every admin-only
/// service method that takes an `&Admin` is unreachable without the check.
#[derive(Debug, Clone, Copy)]
pub struct Admin {
    identity: Identity,
}

impl Admin {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

pub struct AccessControl {
    tokens: Arc<dyn TokenCodec>,
    admin_grants: Arc<dyn AdminGrantRepo>,
}

impl AccessControl {
    pub fn new(tokens: Arc<dyn TokenCodec>, admin_grants: Arc<dyn AdminGrantRepo>) -> Self {
        Self { tokens, admin_grants }
    }

    /// Mandatory authentication from a raw `Authorization` header value.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Identity> {
        let header = authorization
            .ok_or_else(|| DomainError::Unauthenticated("No token provided".into()))?;
        let token = bearer_token(header)
            .ok_or_else(|| DomainError::Unauthenticated("Invalid token".into()))?;
        let claims = self.tokens.verify(token)?;
        Ok(Identity { account_id: claims.account_id })
    }

    /// Optional authentication: any failure degrades to an anonymous caller.
    pub fn authenticate_optional(&self, authorization: Option<&str>) -> Option<Identity> {
        authorization.and_then(|header| self.authenticate(Some(header)).ok())
    }

    pub async fn require_admin(&self, identity: Identity) -> Result<Admin> {
        if self.admin_grants.is_admin(identity.account_id).await? {
            Ok(Admin { identity })
        } else {
            warn!(account_id = %identity.account_id, "admin privileges denied");
            Err(DomainError::Forbidden("Admin privileges required".into()))
        }
    }
}

/// Extracts the token from `Bearer <token>`. The scheme is case-insensitive.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
