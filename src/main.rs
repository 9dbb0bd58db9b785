use anyhow::Context;
use tracing_subscriber::EnvFilter;

use bootcamp_api::config::AppConfig;
use bootcamp_api::database::Database;
use bootcamp_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env, then config/config.env, so cargo run picks up DATABASE_URL and JWT_SECRET
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_filename("config/config.env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bootcamp_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Bootcamp API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; login and registration will fail");
    }

    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        db.migrate().await.context("failed to run migrations")?;
    }

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    let state = AppState::new(db.clone(), config);
    tracing::info!("Bootcamp API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}
