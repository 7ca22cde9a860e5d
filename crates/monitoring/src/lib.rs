//! Client side of the monitoring stack.
//!
//! Talks to Grafana's HTTP API to reconcile the datasource, folder and
//! dashboard this service owns, writes Prometheus alert rules and triggers
//! reloads, and probes the stack's reachability.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod provision;
pub mod reconcile;
pub mod reload;
pub mod status;

pub use api::{CreateOutcome, GrafanaApi, GrafanaApiError};
pub use config::MonitoringConfig;
pub use provision::{provision, ProvisionError, ProvisionPlan, ProvisionReport, ProvisionRequest};
pub use reconcile::{Reconciled, Reconciler};
pub use reload::{write_rules_and_reload, ReloadError};
