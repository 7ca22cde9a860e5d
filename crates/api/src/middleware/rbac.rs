//! Role gates built on [`AuthUser`].
//!
//! The SRD service has two roles: admins manage users, thresholds and
//! Grafana provisioning; users only see the stack status and their
//! Grafana links.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use srd_core::error::CoreError;
use srd_core::roles::{is_known_role, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&str) -> bool,
    denial: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed(&user.role) {
        tracing::debug!(user_id = user.user_id, role = %user.role, "Role check failed");
        return Err(AppError::Core(CoreError::Forbidden(denial.into())));
    }
    Ok(user)
}

/// `admin` only; 403 for anyone else.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, |role| role == ROLE_ADMIN, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Any signed-in account with a recognised role.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, is_known_role, "Unknown role")
            .await
            .map(RequireAuth)
    }
}
