use std::sync::Arc;

use srd_monitoring::GrafanaApi;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool and HTTP clients are handles, the config is
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Account store connection pool.
    pub pool: srd_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Grafana client built from `config.monitoring`.
    pub grafana: GrafanaApi,
    /// Outbound client for reload calls and status probes.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: srd_db::DbPool, config: ServerConfig) -> Self {
        let http = reqwest::Client::new();
        let grafana = GrafanaApi::with_client(
            http.clone(),
            config.monitoring.grafana_url.clone(),
            config.monitoring.grafana_token.clone(),
        );
        Self {
            pool,
            config: Arc::new(config),
            grafana,
            http,
        }
    }
}
