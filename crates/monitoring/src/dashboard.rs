//! Dashboard template handling and the save envelope Grafana expects.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

/// Placeholder datasource uid used in the dashboard template.
pub const DATASOURCE_PLACEHOLDER: &str = "__PROM__";
/// Dashboard JSON schema version sent with every save.
pub const SCHEMA_VERSION: u32 = 39;
const DEFAULT_TITLE: &str = "New Dashboard";
const SAVE_MESSAGE: &str = "Provisioned by SRD admin";

/// Errors reading or writing the dashboard template file.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to access dashboard template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dashboard template is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("dashboard template must be a JSON object")]
    NotAnObject,
}

/// Reduce a dashboard definition to the fixed envelope Grafana is sent:
/// `uid`, `title`, `timezone`, `schemaVersion`, `version`, `panels`.
///
/// Missing `uid` becomes `null` (Grafana assigns one), a missing title
/// becomes `"New Dashboard"` and missing panels an empty list.
pub fn normalize(dashboard: &Value) -> Value {
    json!({
        "uid": dashboard.get("uid").cloned().unwrap_or(Value::Null),
        "title": dashboard
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE),
        "timezone": "browser",
        "schemaVersion": SCHEMA_VERSION,
        "version": 1,
        "panels": dashboard
            .get("panels")
            .filter(|p| p.is_array())
            .cloned()
            .unwrap_or_else(|| json!([])),
    })
}

/// Wrap a normalised dashboard in the `POST /api/dashboards/db` body.
pub fn save_request(envelope: Value, folder_uid: &str) -> Value {
    json!({
        "dashboard": envelope,
        "folderUid": folder_uid,
        "overwrite": true,
        "message": SAVE_MESSAGE,
    })
}

/// Replace every `{"type": "prometheus", "uid": "__PROM__"}` datasource
/// reference with the resolved datasource uid. Returns how many references
/// were rewritten.
pub fn inject_datasource_uid(dashboard: &mut Value, datasource_uid: &str) -> usize {
    match dashboard {
        Value::Object(map) => {
            let mut replaced = map
                .values_mut()
                .map(|v| inject_datasource_uid(v, datasource_uid))
                .sum();
            if is_placeholder_ref(map) {
                map.insert("uid".into(), Value::String(datasource_uid.to_string()));
                replaced += 1;
            }
            replaced
        }
        Value::Array(items) => items
            .iter_mut()
            .map(|v| inject_datasource_uid(v, datasource_uid))
            .sum(),
        _ => 0,
    }
}

fn is_placeholder_ref(map: &Map<String, Value>) -> bool {
    map.get("type").and_then(Value::as_str) == Some("prometheus")
        && map.get("uid").and_then(Value::as_str) == Some(DATASOURCE_PLACEHOLDER)
}

/// Read and parse the dashboard template file.
pub async fn load_template(path: &Path) -> Result<Value, TemplateError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_template(&text)
}

/// Validate `text` as a dashboard template and overwrite the file with it.
///
/// The file is left untouched if `text` does not parse as a JSON object.
pub async fn save_template(path: &Path, text: &str) -> Result<Value, TemplateError> {
    let parsed = parse_template(text)?;

    let io_err = |source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, text).await.map_err(io_err)?;

    tracing::info!(path = %path.display(), "Dashboard template replaced");
    Ok(parsed)
}

/// Parse template text, requiring a top-level JSON object.
pub fn parse_template(text: &str) -> Result<Value, TemplateError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(TemplateError::NotAnObject);
    }
    Ok(value)
}
