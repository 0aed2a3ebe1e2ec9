//! # services
//!
//! Application logic on top of the `domains` ports. Nothing here knows about HTTP,
//! SQL or token formats; adapters are injected through [`Ports`].

pub mod access;
pub mod accounts;
pub mod comments;
pub mod complaints;
pub mod engagement;
pub mod input;
pub mod moderation;
pub mod post_query;
pub mod posts;

use std::sync::Arc;

use domains::{
    AccountRepo, AdminGrantRepo, CommentRepo, ComplaintRepo, CredentialHasher, LikeRepo, PostRepo,
    TokenCodec,
};

pub use access::{AccessControl, Admin};
pub use accounts::{AccountService, LoginInput, RegisterInput};
pub use comments::{CommentEdit, CommentInput, CommentService};
pub use complaints::{ComplaintInput, ComplaintService};
pub use engagement::EngagementService;
pub use moderation::ModerationService;
pub use post_query::ListPostsParams;
pub use posts::{PostInput, PostService};

/// Every adapter the services need, chosen by the binary at startup.
#[derive(Clone)]
pub struct Ports {
    pub accounts: Arc<dyn AccountRepo>,
    pub admin_grants: Arc<dyn AdminGrantRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub comments: Arc<dyn CommentRepo>,
    pub likes: Arc<dyn LikeRepo>,
    pub complaints: Arc<dyn ComplaintRepo>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub tokens: Arc<dyn TokenCodec>,
}

/// The assembled service layer shared by all request handlers.
#[derive(Clone)]
pub struct Services {
    pub access: Arc<AccessControl>,
    pub accounts: Arc<AccountService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub engagement: Arc<EngagementService>,
    pub complaints: Arc<ComplaintService>,
    pub moderation: Arc<ModerationService>,
}

impl Services {
    pub fn new(ports: Ports) -> Self {
        Self {
            access: Arc::new(AccessControl::new(ports.tokens.clone(), ports.admin_grants.clone())),
            accounts: Arc::new(AccountService::new(
                ports.accounts.clone(),
                ports.admin_grants,
                ports.hasher,
                ports.tokens,
            )),
            posts: Arc::new(PostService::new(ports.posts)),
            comments: Arc::new(CommentService::new(ports.comments.clone(), ports.accounts.clone())),
            engagement: Arc::new(EngagementService::new(ports.likes)),
            complaints: Arc::new(ComplaintService::new(ports.complaints)),
            moderation: Arc::new(ModerationService::new(ports.accounts, ports.comments)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use domains::{Identity, MockAdminGrantRepo, MockTokenCodec};
    use uuid::Uuid;

    use crate::access::{AccessControl, Admin};

    /// An `Admin` obtained the only way one can be: through the privilege check.
    pub async fn admin() -> Admin {
        let mut grants = MockAdminGrantRepo::new();
        grants.expect_is_admin().returning(|_| Ok(true));
        AccessControl::new(Arc::new(MockTokenCodec::new()), Arc::new(grants))
            .require_admin(Identity { account_id: Uuid::now_v7() })
            .await
            .expect("grant")
    }
}
