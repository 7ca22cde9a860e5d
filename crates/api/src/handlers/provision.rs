//! Provision the Grafana datasource, folder and dashboard in one call.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use srd_monitoring::{provision, ProvisionPlan, ProvisionReport, ProvisionRequest};

use super::optional_json;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub ok: bool,
    pub grafana_url: String,
    #[serde(flatten)]
    pub report: ProvisionReport,
}

/// POST /api/v1/admin/provision
///
/// Optional body `{datasource?, folder?: {title}, dashboard?}`. Missing
/// parts come from configuration and the dashboard template file.
pub async fn provision_all(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: Bytes,
) -> AppResult<Json<ProvisionResponse>> {
    let body = optional_json(&body)?;
    let request: ProvisionRequest = if body.is_null() {
        ProvisionRequest::default()
    } else {
        serde_json::from_value(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid provisioning request: {e}")))?
    };

    let plan = ProvisionPlan::resolve(&state.config.monitoring, request)
        .await
        .map_err(srd_monitoring::ProvisionError::from)?;

    tracing::info!(admin_id = admin.user_id, folder = %plan.folder_title, "Provisioning Grafana");
    let report = provision(&state.grafana, plan).await?;

    Ok(Json(ProvisionResponse {
        ok: true,
        grafana_url: state.grafana.base_url().to_string(),
        report,
    }))
}
