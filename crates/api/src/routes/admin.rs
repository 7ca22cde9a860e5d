//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, alerts, grafana, provision};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                       -> list_users
/// POST   /users                       -> create_user
/// GET    /users/{id}                  -> get_user
/// PUT    /users/{id}                  -> update_user
/// DELETE /users/{id}                  -> deactivate_user
/// POST   /users/{id}/toggle           -> toggle_user
/// POST   /users/{id}/reset-password   -> reset_password
/// POST   /provision                   -> provision_all
/// POST   /alerts/thresholds           -> update_thresholds
/// GET    /grafana-info                -> grafana_info
/// GET    /dashboard-template          -> get_template
/// PUT    /dashboard-template          -> put_template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route("/users/{id}/toggle", post(admin::toggle_user))
        .route("/users/{id}/reset-password", post(admin::reset_password))
        .route("/provision", post(provision::provision_all))
        .route("/alerts/thresholds", post(alerts::update_thresholds))
        .route("/grafana-info", get(grafana::grafana_info))
        .route(
            "/dashboard-template",
            get(grafana::get_template).put(grafana::put_template),
        )
}
