//! Write the alert rules file and ask Prometheus and Alertmanager to reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

const RELOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to write rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reload request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("reload request to {url} returned {status}")]
    Status { url: String, status: u16 },
}

impl ReloadError {
    /// Whether the failure came from the remote reload endpoint rather than
    /// the local filesystem.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}

/// Overwrite `path` with `rules` and trigger both reloads.
///
/// The primary (Prometheus) reload must answer 2xx or the call fails, even
/// though the file has already been written. The secondary (Alertmanager)
/// reload is best-effort and only logged on failure.
pub async fn write_rules_and_reload(
    client: &reqwest::Client,
    path: &Path,
    rules: &str,
    primary_url: &str,
    secondary_url: &str,
) -> Result<(), ReloadError> {
    write_rules(path, rules).await?;
    tracing::info!(path = %path.display(), bytes = rules.len(), "Wrote alert rules");

    post_reload(client, primary_url).await?;
    tracing::info!(url = primary_url, "Prometheus reloaded");

    if let Err(e) = post_reload(client, secondary_url).await {
        tracing::warn!(error = %e, "Alertmanager reload failed");
    }

    Ok(())
}

async fn write_rules(path: &Path, rules: &str) -> Result<(), ReloadError> {
    let io_err = |source| ReloadError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, rules).await.map_err(io_err)
}

async fn post_reload(client: &reqwest::Client, url: &str) -> Result<(), ReloadError> {
    let response = client
        .post(url)
        .timeout(RELOAD_TIMEOUT)
        .send()
        .await
        .map_err(|source| ReloadError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ReloadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}
