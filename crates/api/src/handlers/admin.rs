//! Handlers for `/admin/users` (user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use srd_core::error::CoreError;
use srd_core::roles::{is_known_role, ROLE_ADMIN, ROLE_USER};
use srd_core::types::DbId;
use srd_db::models::user::{CreateUser, UpdateUser, UserResponse};
use srd_db::repositories::UserRepo;
use validator::Validate;

use super::auth::normalize_email;
use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 2, max = 120, message = "must be between 2 and 120 characters"))]
    pub name: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 2, max = 120, message = "must be between 2 and 120 characters"))]
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

fn default_role() -> String {
    ROLE_USER.to_string()
}

fn check_role(role: &str) -> AppResult<()> {
    if is_known_role(role) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::invalid_field(
            "role",
            "must be 'user' or 'admin'",
        )))
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
///
/// Create a user. The email is stored lower-cased; a duplicate email is a
/// 409 Conflict.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(mut input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.email = normalize_email(&input.email);
    input.name = input.name.trim().to_string();
    input.validate()?;
    check_role(&input.role)?;

    if UserRepo::find_by_email(&state.pool, &input.email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email,
            name: input.name,
            password_hash,
            role: input.role,
        },
    )
    .await?;

    tracing::info!(admin_id = admin.user_id, user_id = user.id, role = %user.role, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update profile fields. Passwords go through `reset-password`.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    input.email = input.email.as_deref().map(normalize_email);
    input.name = input.name.map(|n| n.trim().to_string());
    input.validate()?;
    if let Some(role) = &input.role {
        check_role(role)?;
    }
    let locks_out = input.is_active == Some(false)
        || input.role.as_deref().is_some_and(|role| role != ROLE_ADMIN);
    if locks_out {
        refuse_self(admin.user_id, id)?;
    }

    let update = UpdateUser {
        email: input.email,
        name: input.name,
        role: input.role,
        is_active: input.is_active,
    };
    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user. Returns 204 No Content.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    refuse_self(admin.user_id, id)?;
    if UserRepo::deactivate(&state.pool, id).await? {
        tracing::info!(admin_id = admin.user_id, user_id = id, "User deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/admin/users/{id}/toggle
///
/// Flip the active flag and return the updated user.
pub async fn toggle_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    refuse_self(admin.user_id, id)?;
    let user = UserRepo::toggle_active(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(admin_id = admin.user_id, user_id = id, is_active = user.is_active, "User toggled");
    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/v1/admin/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if UserRepo::update_password(&state.pool, id, &hashed).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// Admins cannot lock themselves out.
fn refuse_self(admin_id: DbId, target: DbId) -> AppResult<()> {
    if admin_id == target {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot deactivate or demote your own account".into(),
        )));
    }
    Ok(())
}
