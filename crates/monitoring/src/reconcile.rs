//! Ensure-or-create reconciliation of Grafana resources.
//!
//! Datasources and folders have no native upsert, so each ensure call is a
//! two-step protocol: try to create, and on a conflict look the resource up
//! by its identity key. At most one create call is issued per identity.
//! Dashboards are saved with `overwrite: true`, which Grafana treats as an
//! upsert keyed by uid.

use serde::Serialize;
use serde_json::Value;

use crate::api::{CreateOutcome, GrafanaApi, GrafanaApiError};
use crate::dashboard;

/// Outcome of reconciling one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciled {
    /// `false` when an existing resource with the same identity was returned.
    pub created: bool,
    /// Grafana's representation of the resource.
    pub data: Value,
}

impl Reconciled {
    fn created(data: Value) -> Self {
        Self {
            created: true,
            data,
        }
    }

    fn existing(data: Value) -> Self {
        Self {
            created: false,
            data,
        }
    }

    /// Uid of the resource.
    ///
    /// Listing entries and folder/dashboard responses carry `uid` at the top
    /// level; a datasource create response nests it under `datasource`.
    pub fn uid(&self) -> Option<&str> {
        self.data
            .get("uid")
            .and_then(Value::as_str)
            .or_else(|| self.data.pointer("/datasource/uid").and_then(Value::as_str))
            .filter(|uid| !uid.is_empty())
    }
}

/// Runs the ensure protocol against one Grafana instance.
pub struct Reconciler<'a> {
    api: &'a GrafanaApi,
}

impl<'a> Reconciler<'a> {
    pub fn new(api: &'a GrafanaApi) -> Self {
        Self { api }
    }

    /// Create the datasource, or return the existing one with the same
    /// identity (see [`find_datasource`]).
    pub async fn ensure_datasource(&self, payload: &Value) -> Result<Reconciled, GrafanaApiError> {
        match self.api.create_datasource(payload).await? {
            CreateOutcome::Created(data) => {
                tracing::info!(name = ?payload.get("name"), "Created Grafana datasource");
                Ok(Reconciled::created(data))
            }
            CreateOutcome::Conflict(conflict) => {
                let listing = self.api.list_datasources().await?;
                resolve_conflict("datasource", conflict, find_datasource(listing, payload))
            }
        }
    }

    /// Create the folder, or return the existing one with the same title.
    pub async fn ensure_folder(&self, title: &str) -> Result<Reconciled, GrafanaApiError> {
        match self.api.create_folder(title).await? {
            CreateOutcome::Created(data) => {
                tracing::info!(title, "Created Grafana folder");
                Ok(Reconciled::created(data))
            }
            CreateOutcome::Conflict(conflict) => {
                let listing = self.api.list_folders().await?;
                let found = listing
                    .into_iter()
                    .find(|f| f.get("title").and_then(Value::as_str) == Some(title));
                resolve_conflict("folder", conflict, found)
            }
        }
    }

    /// Save a dashboard into an already resolved folder, overwriting any
    /// dashboard with the same uid.
    ///
    /// The payload is normalised with [`dashboard::normalize`] first. The
    /// result always has `created: true`: Grafana does not say whether the
    /// save replaced an existing version.
    pub async fn upsert_dashboard(
        &self,
        payload: &Value,
        folder_uid: &str,
    ) -> Result<Reconciled, GrafanaApiError> {
        let envelope = dashboard::normalize(payload);
        let body = dashboard::save_request(envelope, folder_uid);
        let data = self.api.save_dashboard(&body).await?;
        tracing::info!(
            folder_uid,
            uid = ?data.get("uid"),
            version = ?data.get("version"),
            "Saved Grafana dashboard"
        );
        Ok(Reconciled::created(data))
    }
}

/// Find the listed datasource matching `payload`'s identity.
///
/// Grafana rejects duplicate names, so a `name` match wins. The `type` +
/// `url` pair is consulted only when no listed datasource carries the name.
pub fn find_datasource(listing: Vec<Value>, payload: &Value) -> Option<Value> {
    let name = str_field(payload, "name");
    if let Some(pos) = listing
        .iter()
        .position(|ds| name.is_some() && str_field(ds, "name") == name)
    {
        return listing.into_iter().nth(pos);
    }

    let kind = str_field(payload, "type")?;
    let url = str_field(payload, "url")?;
    listing
        .into_iter()
        .find(|ds| str_field(ds, "type") == Some(kind) && str_field(ds, "url") == Some(url))
}

fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str)
}

fn resolve_conflict(
    kind: &str,
    conflict: GrafanaApiError,
    found: Option<Value>,
) -> Result<Reconciled, GrafanaApiError> {
    match found {
        Some(existing) => {
            tracing::info!(kind, "Reusing existing Grafana resource");
            Ok(Reconciled::existing(existing))
        }
        None => {
            tracing::warn!(kind, error = %conflict, "Conflict reported but no matching resource listed");
            Err(conflict)
        }
    }
}
