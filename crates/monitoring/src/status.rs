//! Reachability probe for Prometheus and Grafana.

use std::time::Duration;

use serde::Serialize;

use crate::api::GrafanaApi;
use crate::config::MonitoringConfig;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StackStatus {
    pub prometheus: bool,
    pub grafana: bool,
}

/// Probe the Prometheus base URL and Grafana `/api/health` concurrently.
/// Any failure, including a non-2xx answer, reports the service as down.
pub async fn probe(
    client: &reqwest::Client,
    grafana: &GrafanaApi,
    config: &MonitoringConfig,
) -> StackStatus {
    let prometheus = async {
        client
            .get(&config.prometheus_url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    };
    let grafana = async { grafana.health().await.is_ok() };

    let (prometheus, grafana) = tokio::join!(prometheus, grafana);
    tracing::debug!(prometheus, grafana, "Probed monitoring stack");
    StackStatus {
        prometheus,
        grafana,
    }
}
