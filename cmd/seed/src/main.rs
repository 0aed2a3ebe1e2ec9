//! # seed
//!
//! Operator tool for the Postgres backend. Admin grants have no HTTP surface,
//! so they are managed from here. Reads the same configuration as the server.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use configs::{DatabaseBackend, Settings};
use secrecy::ExposeSecret;
use storage_adapters::postgres::{self, PgAdminGrantRepo, PgPool};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Promo board maintenance commands")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations
    Migrate,

    /// Grant the admin privilege to an existing account
    GrantAdmin {
        /// Email the account registered with
        email: String,
    },

    /// Revoke the admin privilege
    RevokeAdmin {
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let settings = Settings::load().context("loading settings")?;
    if settings.database.backend != DatabaseBackend::Postgres {
        anyhow::bail!("seed only works against the postgres backend");
    }

    let pool = connect(&settings).await?;
    match cli.command {
        Command::Migrate => {
            postgres::run_migrations(&pool).await.context("running migrations")?;
            info!("migrations applied");
        }
        Command::GrantAdmin { email } => set_admin(&pool, &email, true).await?,
        Command::RevokeAdmin { email } => set_admin(&pool, &email, false).await?,
    }
    Ok(())
}

async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    let db = &settings.database;
    postgres::connect(db.url.expose_secret(), 1, Duration::from_secs(db.acquire_timeout_secs))
        .await
        .context("connecting to postgres")
}

async fn set_admin(pool: &PgPool, email: &str, is_admin: bool) -> anyhow::Result<()> {
    postgres::run_migrations(pool).await.context("running migrations")?;
    let repo = PgAdminGrantRepo::new(pool.clone());
    let email = email.trim();
    if !repo.set_admin_by_email(email, is_admin).await? {
        anyhow::bail!("no account registered with {email}");
    }
    info!(%email, is_admin, "admin grant updated");
    Ok(())
}
