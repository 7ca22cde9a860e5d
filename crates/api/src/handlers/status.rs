//! Endpoints available to every signed-in user.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use srd_monitoring::status::{probe, StackStatus};

use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/status
///
/// Reachability of Prometheus and Grafana. Never fails; an unreachable
/// service reports `false`.
pub async fn stack_status(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Json<StackStatus> {
    Json(probe(&state.http, &state.grafana, &state.config.monitoring).await)
}

#[derive(Debug, Serialize)]
pub struct UserHome {
    pub grafana_url: String,
    pub folder_title: String,
    pub dashboard_title: String,
}

/// GET /api/v1/user/home
pub async fn user_home(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Json<DataResponse<UserHome>> {
    let monitoring = &state.config.monitoring;
    Json(DataResponse {
        data: UserHome {
            grafana_url: monitoring.grafana_url.clone(),
            folder_title: monitoring.folder_title.clone(),
            dashboard_title: monitoring.dashboard_title.clone(),
        },
    })
}
