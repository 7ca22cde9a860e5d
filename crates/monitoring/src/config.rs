use std::path::PathBuf;

/// Endpoints, credentials and names for the monitoring stack.
///
/// Every field has a default suitable for a local docker-compose stack.
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// Grafana base URL, without a trailing slash.
    pub grafana_url: String,
    /// Grafana service-account token sent as a bearer token. May be empty.
    pub grafana_token: String,
    /// Prometheus URL as seen from this service (status probe).
    pub prometheus_url: String,
    /// Prometheus URL as seen from Grafana (datasource `url`).
    pub prometheus_datasource_url: String,
    pub datasource_name: String,
    pub folder_title: String,
    pub dashboard_title: String,
    /// Uid used when the dashboard template does not carry one.
    pub dashboard_uid: String,
    pub dashboard_template_path: PathBuf,
    pub rules_path: PathBuf,
    pub prom_reload_url: String,
    pub alertmanager_reload_url: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            grafana_url: "http://localhost:3001".into(),
            grafana_token: String::new(),
            prometheus_url: "http://localhost:9090".into(),
            prometheus_datasource_url: "http://prometheus:9090".into(),
            datasource_name: "Prometheus".into(),
            folder_title: "SRD - API Provisioned".into(),
            dashboard_title: "SRD - Network Resources (HTTP API)".into(),
            dashboard_uid: "srd-api".into(),
            dashboard_template_path: PathBuf::from("provisioning/dashboard_http_api.json"),
            rules_path: PathBuf::from("prometheus/rules.yml"),
            prom_reload_url: "http://localhost:9090/-/reload".into(),
            alertmanager_reload_url: "http://localhost:9093/-/reload".into(),
        }
    }
}

impl MonitoringConfig {
    /// Load configuration from environment variables, falling back to
    /// [`Default`] for anything unset.
    ///
    /// | Env Var                     | Default                                  |
    /// |-----------------------------|------------------------------------------|
    /// | `GRAFANA_URL`               | `http://localhost:3001`                  |
    /// | `GRAFANA_TOKEN`             | empty                                    |
    /// | `PROMETHEUS_URL`            | `http://localhost:9090`                  |
    /// | `PROMETHEUS_DATASOURCE_URL` | `http://prometheus:9090`                 |
    /// | `GRAFANA_DATASOURCE_NAME`   | `Prometheus`                             |
    /// | `GRAFANA_FOLDER_TITLE`      | `SRD - API Provisioned`                  |
    /// | `GRAFANA_DASHBOARD_TITLE`   | `SRD - Network Resources (HTTP API)`     |
    /// | `GRAFANA_DASHBOARD_UID`     | `srd-api`                                |
    /// | `DASHBOARD_TEMPLATE_PATH`   | `provisioning/dashboard_http_api.json`   |
    /// | `PROM_RULES_PATH`           | `prometheus/rules.yml`                   |
    /// | `PROM_RELOAD_URL`           | `http://localhost:9090/-/reload`         |
    /// | `ALERTMANAGER_RELOAD_URL`   | `http://localhost:9093/-/reload`         |
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            grafana_url: env_or("GRAFANA_URL", d.grafana_url)
                .trim_end_matches('/')
                .to_string(),
            grafana_token: env_or("GRAFANA_TOKEN", d.grafana_token),
            prometheus_url: env_or("PROMETHEUS_URL", d.prometheus_url),
            prometheus_datasource_url: env_or(
                "PROMETHEUS_DATASOURCE_URL",
                d.prometheus_datasource_url,
            ),
            datasource_name: env_or("GRAFANA_DATASOURCE_NAME", d.datasource_name),
            folder_title: env_or("GRAFANA_FOLDER_TITLE", d.folder_title),
            dashboard_title: env_or("GRAFANA_DASHBOARD_TITLE", d.dashboard_title),
            dashboard_uid: env_or("GRAFANA_DASHBOARD_UID", d.dashboard_uid),
            dashboard_template_path: std::env::var("DASHBOARD_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(d.dashboard_template_path),
            rules_path: std::env::var("PROM_RULES_PATH")
                .map(PathBuf::from)
                .unwrap_or(d.rules_path),
            prom_reload_url: env_or("PROM_RELOAD_URL", d.prom_reload_url),
            alertmanager_reload_url: env_or("ALERTMANAGER_RELOAD_URL", d.alertmanager_reload_url),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}
