use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use srd_core::error::CoreError;
use srd_monitoring::dashboard::TemplateError;
use srd_monitoring::{GrafanaApiError, ProvisionError, ReloadError};
use validator::ValidationErrors;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, the monitoring crate's errors for
/// remote and filesystem failures, and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `srd_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A provisioning run failed. The body carries `ok: false`.
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Reload(#[from] ReloadError),

    #[error(transparent)]
    Grafana(#[from] GrafanaApiError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<ValidationErrors> for AppError {
    /// Collapse field errors into one message naming each failing field,
    /// e.g. `"email must be a valid email address; name must be between 2
    /// and 120 characters"`.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .iter()
            .map(|(field, errs)| {
                let reason = errs
                    .first()
                    .and_then(|e| e.message.as_deref())
                    .unwrap_or("is invalid");
                format!("{field} {reason}")
            })
            .collect::<Vec<_>>()
            .join("; ");

        AppError::Core(CoreError::Validation(message))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => internal(msg),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Monitoring stack ---
            AppError::Provision(err) if err.is_upstream() => upstream(err),
            AppError::Reload(err) if err.is_upstream() => upstream(err),
            AppError::Grafana(err) => upstream(err),
            AppError::Template(TemplateError::Parse(_) | TemplateError::NotAnObject) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            AppError::Provision(err) => internal(err),
            AppError::Reload(err) => internal(err),
            AppError::Template(err) => internal(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if matches!(self, AppError::Provision(_)) {
            body["ok"] = json!(false);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn upstream(err: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::warn!(error = %err, "Upstream call failed");
    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
}

fn internal(err: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => (
            StatusCode::CONFLICT,
            "CONFLICT",
            "A record with this value already exists".to_string(),
        ),
        other => internal(other),
    }
}
