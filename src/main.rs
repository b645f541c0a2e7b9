use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use movilidad_api::config::AppConfig;
use movilidad_api::database::{schema, Database};
use movilidad_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("movilidad_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting movilidad API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }

    let db = Database::connect(&config.database).await.context("connecting to database")?;
    schema::bootstrap(&db).await.context("bootstrapping schema")?;

    tokio::fs::create_dir_all(&config.api.uploads_dir)
        .await
        .with_context(|| format!("creating uploads directory {}", config.api.uploads_dir.display()))?;

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    let state = AppState::new(db.clone(), config).context("building mail relay client")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Movilidad API listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
