use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use srd_api::app;
use srd_api::bootstrap;
use srd_api::config::ServerConfig;
use srd_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "srd_api=debug,srd_monitoring=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        grafana = %config.monitoring.grafana_url,
        rules = %config.monitoring.rules_path.display(),
        "Loaded server configuration"
    );
    if config.monitoring.grafana_token.is_empty() {
        tracing::warn!("GRAFANA_TOKEN is not set; Grafana calls will be unauthenticated");
    }

    // --- Account store ---
    let pool = srd_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open database");
    srd_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    srd_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!(url = %config.database_url, "Account store ready");

    bootstrap::ensure_default_admin(&pool)
        .await
        .expect("Failed to bootstrap default admin");

    // --- HTTP ---
    let cors = app::cors_layer(&config.cors_origins)
        .unwrap_or_else(|e| panic!("Invalid CORS_ORIGINS: {e}"));
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let router = app::build_router(AppState::new(pool, config), cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Starting SRD admin API");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutting down");
}
