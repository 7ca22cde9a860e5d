//! Read-only Grafana listings and dashboard template management.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use srd_monitoring::dashboard;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GrafanaInfo {
    pub datasources: Vec<Value>,
    pub dashboards: Vec<Value>,
}

/// GET /api/v1/admin/grafana-info
pub async fn grafana_info(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<GrafanaInfo>> {
    let datasources = state.grafana.list_datasources().await?;
    let dashboards = state.grafana.search_dashboards().await?;
    Ok(Json(GrafanaInfo {
        datasources,
        dashboards,
    }))
}

/// GET /api/v1/admin/dashboard-template
pub async fn get_template(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Value>>> {
    let template = dashboard::load_template(&state.config.monitoring.dashboard_template_path).await?;
    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/v1/admin/dashboard-template
///
/// Replace the template with the raw request body, which must be a JSON
/// object. The text is stored as sent. Provisioning picks it up on the
/// next run.
pub async fn put_template(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: String,
) -> AppResult<Json<DataResponse<Value>>> {
    let template =
        dashboard::save_template(&state.config.monitoring.dashboard_template_path, &body).await?;
    tracing::info!(admin_id = admin.user_id, "Dashboard template updated");
    Ok(Json(DataResponse { data: template }))
}
