use anyhow::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use visit_ledger::config::Config;
use visit_ledger::health::Readiness;
use visit_ledger::ledger::Limit;
use visit_ledger::{build_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    if let Err(e) = run(config).await {
        tracing::error!("startup failed: {e:#}");
        return Err(e);
    }
    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    let pool = db::init_pool(&config.database_url, config.max_connections)
        .context("invalid database URL")?;

    db::wait_for_storage(&pool, &config.retry_policy())
        .await
        .context("storage never became reachable")?;
    db::init_schema(&pool, &config.seed_messages)
        .await
        .context("failed to initialize schema")?;

    let readiness = Readiness::new();
    let recent_limit = Limit::new(config.recent_limit).unwrap_or_default();
    let app = build_app(AppState::new(pool, readiness.clone(), recent_limit));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    readiness.mark_ready();

    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("server error")?;
    Ok(())
}
