//! # promo-board
//!
//! Server binary: loads settings, picks the storage backend, wires the ports
//! into the services and serves the axum router until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_adapters::{router, AppState, RouterConfig};
use auth_adapters::{Argon2Hasher, JwtTokenCodec};
use configs::{DatabaseBackend, LogFormat, LogSettings, Settings};
use domains::{CredentialHasher, TokenCodec};
use services::{Ports, Services};
use storage_adapters::{FixedWindowRateLimiter, MemoryStore};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let tokens: Arc<dyn TokenCodec> = Arc::new(
        JwtTokenCodec::new(&settings.auth.jwt_secret, settings.auth.token_ttl_secs)
            .context("configuring token codec")?,
    );
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());
    let ports = build_ports(&settings, tokens, hasher).await?;

    let window = Duration::from_secs(settings.rate_limit.login_window_secs);
    let limiter = Arc::new(FixedWindowRateLimiter::new(settings.rate_limit.login_max_attempts, window));
    spawn_limiter_purge(limiter.clone(), window);

    let state = AppState::new(Services::new(ports), limiter);
    let app = router(
        state,
        &RouterConfig {
            base_path: settings.server.base_path.clone(),
            cors_origins: settings.server.cors_origins.clone(),
        },
    );

    let address = settings.bind_addr();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, base_path = %settings.server.base_path, "promo-board listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("promo-board stopped");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn build_ports(
    settings: &Settings,
    tokens: Arc<dyn TokenCodec>,
    hasher: Arc<dyn CredentialHasher>,
) -> anyhow::Result<Ports> {
    match settings.database.backend {
        DatabaseBackend::Memory => {
            warn!("using the in-memory backend; all data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            Ok(Ports {
                accounts: store.clone(),
                admin_grants: store.clone(),
                posts: store.clone(),
                comments: store.clone(),
                likes: store.clone(),
                complaints: store,
                hasher,
                tokens,
            })
        }
        DatabaseBackend::Postgres => postgres_ports(settings, tokens, hasher).await,
    }
}

#[cfg(feature = "db-postgres")]
async fn postgres_ports(
    settings: &Settings,
    tokens: Arc<dyn TokenCodec>,
    hasher: Arc<dyn CredentialHasher>,
) -> anyhow::Result<Ports> {
    use secrecy::ExposeSecret;
    use storage_adapters::postgres::{
        self, PgAccountRepo, PgAdminGrantRepo, PgCommentRepo, PgComplaintRepo, PgLikeRepo, PgPostRepo,
    };

    let db = &settings.database;
    let pool = postgres::connect(
        db.url.expose_secret(),
        db.max_connections,
        Duration::from_secs(db.acquire_timeout_secs),
    )
    .await
    .context("connecting to postgres")?;
    postgres::run_migrations(&pool).await.context("running migrations")?;

    Ok(Ports {
        accounts: Arc::new(PgAccountRepo::new(pool.clone())),
        admin_grants: Arc::new(PgAdminGrantRepo::new(pool.clone())),
        posts: Arc::new(PgPostRepo::new(pool.clone())),
        comments: Arc::new(PgCommentRepo::new(pool.clone())),
        likes: Arc::new(PgLikeRepo::new(pool.clone())),
        complaints: Arc::new(PgComplaintRepo::new(pool)),
        hasher,
        tokens,
    })
}

#[cfg(not(feature = "db-postgres"))]
async fn postgres_ports(
    _settings: &Settings,
    _tokens: Arc<dyn TokenCodec>,
    _hasher: Arc<dyn CredentialHasher>,
) -> anyhow::Result<Ports> {
    anyhow::bail!("built without the db-postgres feature; set database.backend = \"memory\"")
}

fn spawn_limiter_purge(limiter: Arc<FixedWindowRateLimiter>, window: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(window);
        loop {
            tick.tick().await;
            limiter.purge_expired();
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received SIGTERM, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
