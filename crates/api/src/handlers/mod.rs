pub mod admin;
pub mod alerts;
pub mod auth;
pub mod grafana;
pub mod provision;
pub mod status;

use axum::body::Bytes;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Parse a body that may be empty. An empty body reads as `null`.
pub(crate) fn optional_json(body: &Bytes) -> AppResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Request body is not valid JSON: {e}")))
}
