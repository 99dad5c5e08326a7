//! Artifact bootstrap.
//!
//! Matrix artifacts are large and produced offline. On startup every
//! model's file must exist in the data directory; missing ones are
//! downloaded from the configured URL, written to a `.part` file, and
//! renamed into place so a crash never leaves a truncated artifact behind.

use std::path::{Path, PathBuf};
use std::time::Duration;

use backon::Retryable;
use cinematch_core::Model;
use reqwest::Client;

use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::resilience::retry_policy;

const SOURCE_NAME: &str = "artifact store";

/// Downloads missing matrix artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    http: Client,
    max_attempts: usize,
}

impl ArtifactFetcher {
    pub fn new(max_attempts: usize) -> EngineResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("cinematch/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, max_attempts })
    }

    /// Make sure every model's artifact exists under `config.data_dir`.
    ///
    /// Returns the models that had to be downloaded.
    pub async fn ensure_all(&self, config: &Config) -> EngineResult<Vec<Model>> {
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let mut downloaded = Vec::new();
        for model in Model::ALL {
            let path = config.artifact_path(model);
            if self.ensure(&path, config.artifact_url(model)).await? {
                downloaded.push(model);
            }
        }
        Ok(downloaded)
    }

    /// Make sure `path` exists, downloading it from `url` if needed.
    ///
    /// Returns `true` when a download happened.
    pub async fn ensure(&self, path: &Path, url: Option<&str>) -> EngineResult<bool> {
        if tokio::fs::try_exists(path).await? {
            log::debug!("Artifact present: {}", path.display());
            return Ok(false);
        }

        let Some(url) = url else {
            return Err(EngineError::MissingArtifact {
                path: path.to_path_buf(),
            });
        };

        log::info!("Downloading {} from {}", path.display(), url);
        let bytes = (|| self.fetch(url))
            .retry(retry_policy(self.max_attempts))
            .when(EngineError::is_transient)
            .notify(|e: &EngineError, after: Duration| {
                log::warn!("Download of {} failed ({}), retrying in {:?}", url, e, after);
            })
            .await?;

        let partial = partial_path(path);
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, path).await?;
        log::info!("Saved {} ({} bytes)", path.display(), bytes.len());

        Ok(true)
    }

    async fn fetch(&self, url: &str) -> EngineResult<Vec<u8>> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(EngineError::Rejected {
                source_name: SOURCE_NAME.to_string(),
                status: status.as_u16(),
            });
        }

        let response = response.error_for_status().map_err(|e| EngineError::Http {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })?;

        Ok(response.bytes().await?.to_vec())
    }
}

/// Models whose artifact is absent from the data directory.
pub fn missing_artifacts(config: &Config) -> Vec<Model> {
    Model::ALL
        .into_iter()
        .filter(|model| !config.artifact_path(*model).exists())
        .collect()
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
