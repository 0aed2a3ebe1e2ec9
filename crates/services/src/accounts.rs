//! Registration, login and profile lookup.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    AccountRepo, AdminGrantRepo, CredentialHasher, DomainError, Identity, NewAccount, Profile,
    Result, TokenCodec,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::input::{is_valid_email, non_blank};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct AccountService {
    accounts: Arc<dyn AccountRepo>,
    admin_grants: Arc<dyn AdminGrantRepo>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepo>,
        admin_grants: Arc<dyn AdminGrantRepo>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self { accounts, admin_grants, hasher, tokens }
    }

    /// Creates the account and claims its handle in one atomic step.
    pub async fn register(&self, input: RegisterInput) -> Result<Profile> {
        let password = input.password.filter(|p| !p.is_empty());
        let (Some(email), Some(password), Some(username)) = (
            non_blank(input.email.as_deref()),
            password,
            non_blank(input.username.as_deref()),
        ) else {
            return Err(DomainError::validation("Email, password and username are required"));
        };

        if !is_valid_email(&email) {
            return Err(DomainError::validation("Please enter a valid email address."));
        }

        let password_hash = self.hasher.hash(&password)?;
        let profile = self
            .accounts
            .create_with_handle(NewAccount {
                id: Uuid::now_v7(),
                email,
                password_hash,
                handle: username,
                created_at: Utc::now(),
            })
            .await?;

        info!(account_id = %profile.id, "account registered");
        Ok(profile)
    }

    /// Verifies credentials and issues a session token.
    pub async fn login(&self, input: LoginInput) -> Result<String> {
        let (Some(email), Some(password)) = (
            non_blank(input.email.as_deref()),
            input.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(DomainError::validation("Email and password are required."));
        };

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            warn!("login attempt for unknown email");
            return Err(DomainError::validation("Invalid user"));
        };

        if !self.hasher.verify(&password, &account.password_hash)? {
            warn!(account_id = %account.id, "login attempt with wrong password");
            return Err(DomainError::validation("Invalid password"));
        }

        // Embedded for client-side menus only; never trusted for authorization.
        let is_admin = self.admin_grants.is_admin(account.id).await?;
        self.tokens.issue(account.id, is_admin)
    }

    pub async fn me(&self, identity: &Identity) -> Result<Profile> {
        self.accounts
            .find_profile(identity.account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Account, MockAccountRepo, MockAdminGrantRepo, MockCredentialHasher, MockTokenCodec};
    use mockall::predicate::eq;

    struct Mocks {
        accounts: MockAccountRepo,
        grants: MockAdminGrantRepo,
        hasher: MockCredentialHasher,
        tokens: MockTokenCodec,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                accounts: MockAccountRepo::new(),
                grants: MockAdminGrantRepo::new(),
                hasher: MockCredentialHasher::new(),
                tokens: MockTokenCodec::new(),
            }
        }

        fn service(self) -> AccountService {
            AccountService::new(
                Arc::new(self.accounts),
                Arc::new(self.grants),
                Arc::new(self.hasher),
                Arc::new(self.tokens),
            )
        }
    }

    fn stored_account(id: Uuid) -> Account {
        Account {
            id,
            email: "ayse@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            is_blocked: false,
            created_at: Utc::now(),
        }
    }

    fn register_input() -> RegisterInput {
        RegisterInput {
            email: Some("ayse@example.com".into()),
            password: Some("hunter22".into()),
            username: Some("ayse".into()),
        }
    }

    #[tokio::test]
    async fn test_register_requires_all_fields() {
        let service = Mocks::new().service();
        let err = service
            .register(RegisterInput { username: Some("  ".into()), ..register_input() })
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Email, password and username are required");
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_email() {
        let service = Mocks::new().service();
        let err = service
            .register(RegisterInput { email: Some("ayse@localhost".into()), ..register_input() })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let mut mocks = Mocks::new();
        mocks.hasher.expect_hash().returning(|_| Ok("$argon2id$hashed".into()));
        mocks
            .accounts
            .expect_create_with_handle()
            .withf(|new| new.password_hash == "$argon2id$hashed" && new.handle == "ayse")
            .times(1)
            .returning(|new| {
                Ok(Profile {
                    id: new.id,
                    email: new.email,
                    username: Some(new.handle),
                    is_blocked: false,
                    created_at: new.created_at,
                })
            });

        let profile = mocks.service().register(register_input()).await.unwrap();
        assert_eq!(profile.username.as_deref(), Some("ayse"));
    }

    #[tokio::test]
    async fn test_register_surfaces_duplicate_as_conflict() {
        let mut mocks = Mocks::new();
        mocks.hasher.expect_hash().returning(|_| Ok("h".into()));
        mocks.accounts.expect_create_with_handle().returning(|_| {
            Err(DomainError::Conflict("This username is already taken.".into()))
        });

        let err = mocks.service().register(register_input()).await.unwrap_err();
        assert_eq!(err, DomainError::Conflict("This username is already taken.".into()));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut mocks = Mocks::new();
        mocks.accounts.expect_find_by_email().returning(|_| Ok(None));
        let err = mocks
            .service()
            .login(LoginInput { email: Some("nobody@example.com".into()), password: Some("x".into()) })
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Validation("Invalid user".into()));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let id = Uuid::now_v7();
        let mut mocks = Mocks::new();
        mocks.accounts.expect_find_by_email().returning(move |_| Ok(Some(stored_account(id))));
        mocks.hasher.expect_verify().returning(|_, _| Ok(false));
        let err = mocks
            .service()
            .login(LoginInput { email: Some("ayse@example.com".into()), password: Some("nope".into()) })
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Validation("Invalid password".into()));
    }

    #[tokio::test]
    async fn test_login_embeds_admin_snapshot() {
        let id = Uuid::now_v7();
        let mut mocks = Mocks::new();
        mocks.accounts.expect_find_by_email().returning(move |_| Ok(Some(stored_account(id))));
        mocks.hasher.expect_verify().returning(|_, _| Ok(true));
        mocks.grants.expect_is_admin().with(eq(id)).returning(|_| Ok(true));
        mocks
            .tokens
            .expect_issue()
            .with(eq(id), eq(true))
            .times(1)
            .returning(|_, _| Ok("signed".into()));

        let token = mocks
            .service()
            .login(LoginInput { email: Some("ayse@example.com".into()), password: Some("hunter22".into()) })
            .await
            .unwrap();
        assert_eq!(token, "signed");
    }

    #[tokio::test]
    async fn test_me_for_deleted_account() {
        let mut mocks = Mocks::new();
        mocks.accounts.expect_find_profile().returning(|_| Ok(None));
        let err = mocks
            .service()
            .me(&Identity { account_id: Uuid::now_v7() })
            .await
            .unwrap_err();
        assert_eq!(err.message(), "User not found");
    }
}
