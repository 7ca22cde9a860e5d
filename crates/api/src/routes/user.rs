//! Routes open to any signed-in user.

use axum::routing::get;
use axum::Router;

use crate::handlers::status;
use crate::state::AppState;

/// ```text
/// GET /status     -> stack_status
/// GET /user/home  -> user_home
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::stack_status))
        .route("/user/home", get(status::user_home))
}
