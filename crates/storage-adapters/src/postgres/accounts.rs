use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Account, AccountRepo, AdminGrantRepo, NewAccount, Profile, Result};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::map_db_error;

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: String,
    is_blocked: bool,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            is_blocked: row.is_blocked,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    username: Option<String>,
    is_blocked: bool,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            email: row.email,
            username: row.username,
            is_blocked: row.is_blocked,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgAccountRepo {
    pool: PgPool,
}

impl PgAccountRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepo for PgAccountRepo {
    /// Both inserts share a transaction; a handle collision rolls back the account row.
    async fn create_with_handle(&self, new: NewAccount) -> Result<Profile> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("INSERT INTO accounts (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)")
            .bind(new.id)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(new.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("INSERT INTO handles (account_id, handle) VALUES ($1, $2)")
            .bind(new.id)
            .bind(&new.handle)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(Profile {
            id: new.id,
            email: new.email,
            username: Some(new.handle),
            is_blocked: false,
            created_at: new.created_at,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, email, password_hash, is_blocked, created_at FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT a.id, a.email, h.handle AS username, a.is_blocked, a.created_at \
             FROM accounts a LEFT JOIN handles h ON h.account_id = a.id \
             WHERE a.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }

    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "WITH updated AS (UPDATE accounts SET is_blocked = $2 WHERE id = $1 RETURNING *) \
             SELECT u.id, u.email, h.handle AS username, u.is_blocked, u.created_at \
             FROM updated u LEFT JOIN handles h ON h.account_id = u.id",
        )
        .bind(id)
        .bind(blocked)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }
}

#[derive(Clone)]
pub struct PgAdminGrantRepo {
    pool: PgPool,
}

impl PgAdminGrantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts the grant for the account registered under `email`.
    /// Returns false if no such account exists.
    pub async fn set_admin_by_email(&self, email: &str, is_admin: bool) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO admin_grants (account_id, is_admin) \
             SELECT id, $2 FROM accounts WHERE email = $1 \
             ON CONFLICT (account_id) DO UPDATE SET is_admin = EXCLUDED.is_admin",
        )
        .bind(email)
        .bind(is_admin)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AdminGrantRepo for PgAdminGrantRepo {
    async fn is_admin(&self, account_id: Uuid) -> Result<bool> {
        let flag = sqlx::query_scalar::<_, bool>("SELECT is_admin FROM admin_grants WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(flag.unwrap_or(false))
    }
}
