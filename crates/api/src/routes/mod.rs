pub mod admin;
pub mod auth;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout (requires auth)
///
/// /status                              Prometheus / Grafana reachability
/// /user/home                           Grafana links for the signed-in user
///
/// /admin/users                         list, create (admin only)
/// /admin/users/{id}                    get, update, deactivate
/// /admin/users/{id}/toggle             flip active flag
/// /admin/users/{id}/reset-password     reset password
/// /admin/provision                     provision datasource, folder, dashboard
/// /admin/alerts/thresholds             rewrite alert rules and reload
/// /admin/grafana-info                  list datasources and dashboards
/// /admin/dashboard-template            read, replace template
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .merge(user::router())
}
