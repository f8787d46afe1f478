use account_api::{
    build_app, db, AppState, AuthConfig, AuthService, JobQueue, JobWorker, LogNotifier,
    ServerConfig,
};

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let auth_config = AuthConfig::from_env();
    auth_config.validate()?;
    let server_config = ServerConfig::from_env()?;

    let pool = db::connect(&server_config)
        .await
        .context("failed to connect to database; check DATABASE_URL")?;
    db::run_migrations(&pool).await?;

    let auth = Arc::new(AuthService::new(pool, auth_config)?);

    let (jobs, receiver) = JobQueue::new();
    let worker = JobWorker::new(auth.clone(), Arc::new(LogNotifier)).spawn(receiver);

    let app = build_app(AppState::new(auth, jobs), &server_config.cors_origins);

    let listener = TcpListener::bind(&server_config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", server_config.bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last queue sender; let the worker drain
    worker.await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
