//! Provision the datasource, folder and dashboard in dependency order.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{GrafanaApi, GrafanaApiError};
use crate::config::MonitoringConfig;
use crate::dashboard::{self, TemplateError};
use crate::reconcile::{Reconciled, Reconciler};

/// Optional overrides for a provisioning run. Anything left out is taken
/// from configuration and the dashboard template.
#[derive(Debug, Default, Deserialize)]
pub struct ProvisionRequest {
    pub datasource: Option<Value>,
    pub folder: Option<FolderRequest>,
    pub dashboard: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct FolderRequest {
    pub title: Option<String>,
}

/// Fully resolved inputs for [`provision`].
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
    pub datasource: Value,
    pub folder_title: String,
    pub dashboard: Value,
}

impl ProvisionPlan {
    /// Fill the gaps in `request` from `config`.
    ///
    /// The dashboard template is only read when the request carries no
    /// dashboard. A dashboard without a uid gets `config.dashboard_uid`.
    /// A template dashboard is always titled `config.dashboard_title`; a
    /// request dashboard keeps its own title if it has one.
    pub async fn resolve(
        config: &MonitoringConfig,
        request: ProvisionRequest,
    ) -> Result<Self, TemplateError> {
        let datasource = request
            .datasource
            .unwrap_or_else(|| default_datasource(config));

        let folder_title = request
            .folder
            .and_then(|f| f.title)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| config.folder_title.clone());

        let (mut dashboard, from_template) = match request.dashboard {
            Some(d) => (d, false),
            None => (
                dashboard::load_template(&config.dashboard_template_path).await?,
                true,
            ),
        };
        if let Some(map) = dashboard.as_object_mut() {
            let has_uid = map
                .get("uid")
                .and_then(Value::as_str)
                .is_some_and(|uid| !uid.is_empty());
            if !has_uid {
                map.insert("uid".into(), Value::String(config.dashboard_uid.clone()));
            }
            if from_template || !map.contains_key("title") {
                map.insert("title".into(), Value::String(config.dashboard_title.clone()));
            }
        }

        Ok(Self {
            datasource,
            folder_title,
            dashboard,
        })
    }
}

fn default_datasource(config: &MonitoringConfig) -> Value {
    json!({
        "name": config.datasource_name,
        "type": "prometheus",
        "url": config.prometheus_datasource_url,
        "access": "proxy",
        "basicAuth": false,
        "isDefault": true,
    })
}

/// Which provisioning step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    Datasource,
    Folder,
    Dashboard,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Datasource => "datasource",
            Self::Folder => "folder",
            Self::Dashboard => "dashboard",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// A Grafana call failed; later steps were not attempted.
    #[error("{step} provisioning failed: {source}")]
    Upstream {
        step: ProvisionStep,
        #[source]
        source: GrafanaApiError,
    },

    /// The dashboard template could not be read.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl ProvisionError {
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    fn at(step: ProvisionStep) -> impl FnOnce(GrafanaApiError) -> Self {
        move |source| Self::Upstream { step, source }
    }
}

/// Result of a successful provisioning run.
#[derive(Debug, Serialize)]
pub struct ProvisionReport {
    pub datasource: Reconciled,
    pub folder: Reconciled,
    pub dashboard: Reconciled,
    pub dashboard_url: String,
}

/// Run `ensure_datasource`, `ensure_folder` and `upsert_dashboard` in order,
/// stopping at the first failure.
///
/// The datasource uid replaces the `__PROM__` placeholder in the
/// dashboard's Prometheus references before the save.
pub async fn provision(
    api: &GrafanaApi,
    plan: ProvisionPlan,
) -> Result<ProvisionReport, ProvisionError> {
    let reconciler = Reconciler::new(api);
    let ProvisionPlan {
        datasource,
        folder_title,
        mut dashboard,
    } = plan;

    let datasource = reconciler
        .ensure_datasource(&datasource)
        .await
        .map_err(ProvisionError::at(ProvisionStep::Datasource))?;

    let folder = reconciler
        .ensure_folder(&folder_title)
        .await
        .map_err(ProvisionError::at(ProvisionStep::Folder))?;
    let folder_uid = folder.uid().map(str::to_owned).ok_or_else(|| {
        ProvisionError::at(ProvisionStep::Folder)(GrafanaApiError::MalformedResponse(
            "folder response has no uid".into(),
        ))
    })?;

    match datasource.uid() {
        Some(uid) => {
            let replaced = dashboard::inject_datasource_uid(&mut dashboard, uid);
            tracing::debug!(uid, replaced, "Injected datasource uid into dashboard");
        }
        None => tracing::warn!("Datasource has no uid, dashboard placeholders left as is"),
    }

    let saved = reconciler
        .upsert_dashboard(&dashboard, &folder_uid)
        .await
        .map_err(ProvisionError::at(ProvisionStep::Dashboard))?;

    let dashboard_url = match saved.data.get("url").and_then(Value::as_str) {
        Some(path) => format!("{}{}", api.base_url(), path),
        None => api.base_url().to_string(),
    };

    tracing::info!(
        folder = %folder_title,
        datasource_created = datasource.created,
        folder_created = folder.created,
        %dashboard_url,
        "Provisioning complete"
    );

    Ok(ProvisionReport {
        datasource,
        folder,
        dashboard: saved,
        dashboard_url,
    })
}
