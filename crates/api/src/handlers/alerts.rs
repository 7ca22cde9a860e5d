//! Alert threshold updates.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use srd_core::alert_rules::RuleDocument;
use srd_core::thresholds::{PartialThresholds, ThresholdSet};
use srd_monitoring::write_rules_and_reload;

use super::optional_json;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ThresholdsResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub thresholds: ThresholdSet,
}

/// POST /api/v1/admin/alerts/thresholds
///
/// Accepts `{cpu?, memory?, disk?}` (integers or numeric strings, missing
/// keys default to 80). Every value must lie in `[10, 100]`; nothing is
/// written otherwise. On success the rules file is rewritten and Prometheus
/// reloaded.
pub async fn update_thresholds(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: Bytes,
) -> AppResult<Json<ThresholdsResponse>> {
    let thresholds = PartialThresholds::from_json(&optional_json(&body)?)?.merge_defaults();
    thresholds.validate()?;

    let rules = RuleDocument::from_thresholds(&thresholds.into())
        .to_yaml()
        .map_err(|e| AppError::InternalError(format!("Rule serialization error: {e}")))?;

    let monitoring = &state.config.monitoring;
    write_rules_and_reload(
        &state.http,
        &monitoring.rules_path,
        &rules,
        &monitoring.prom_reload_url,
        &monitoring.alertmanager_reload_url,
    )
    .await?;

    tracing::info!(
        admin_id = admin.user_id,
        cpu = thresholds.cpu,
        memory = thresholds.memory,
        disk = thresholds.disk,
        "Alert thresholds updated"
    );
    Ok(Json(ThresholdsResponse {
        status: "ok",
        thresholds,
    }))
}
