//! Spec sources backed by the upstream catalog's model manifest.
//!
//! The manifest is a JSON array with one object per published (model, version)
//! pair:
//! ```json
//! [{"model_id": "pytorch-ic-mobilenet-v2", "version": "1.0.0", "min_version": "2.49.0",
//!   "spec_key": "community_models_specs/pytorch-ic-mobilenet-v2/specs_v1.0.0.json"}]
//! ```
//! The latest version of a model is the highest `version` among its entries.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::apireq::{self, Url};
use super::{Error, ErrorKind, SpecSource};
use crate::version;

#[derive(Debug, Error)]
pub(crate) enum ManifestError {
    #[error("model \"{0}\" is not listed in the catalog manifest")]
    ModelNotListed(String),
    #[error("model \"{0}\" has no valid version in the catalog manifest")]
    NoValidVersion(String),
    #[error("failed to read catalog manifest {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("failed to parse catalog manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<ManifestError> for Error {
    fn from(value: ManifestError) -> Self {
        let kind = match &value {
            ManifestError::ModelNotListed(_) | ManifestError::NoValidVersion(_) => {
                ErrorKind::NotFound
            }
            ManifestError::Io(..) | ManifestError::Parse(_) => ErrorKind::UnexpectedResponse,
        };

        Error::from_source(kind, Box::new(value))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ManifestEntry {
    pub model_id: String,
    pub version: String,
}

fn latest_in(entries: &[ManifestEntry], model_id: &str) -> Result<String, ManifestError> {
    let mut listed = entries
        .iter()
        .filter(|e| e.model_id == model_id)
        .map(|e| e.version.as_str())
        .peekable();

    if listed.peek().is_none() {
        return Err(ManifestError::ModelNotListed(model_id.to_string()));
    }

    version::latest(listed)
        .map(str::to_string)
        .ok_or_else(|| ManifestError::NoValidVersion(model_id.to_string()))
}

/// A manifest read once, e.g. from a local mirror of the catalog.
pub(crate) struct ManifestSpecSource {
    entries: Vec<ManifestEntry>,
}

impl ManifestSpecSource {
    pub(crate) fn new(entries: Vec<ManifestEntry>) -> ManifestSpecSource {
        ManifestSpecSource { entries }
    }

    pub(crate) fn from_json(raw: &str) -> Result<ManifestSpecSource, ManifestError> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub(crate) fn from_path(path: &Path) -> Result<ManifestSpecSource, ManifestError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ManifestError::Io(path.display().to_string(), e))?;

        Self::from_json(&raw)
    }
}

#[async_trait]
impl SpecSource for ManifestSpecSource {
    async fn get_latest_version(&self, model_id: &str) -> Result<String, Error> {
        Ok(latest_in(&self.entries, model_id)?)
    }
}

/// Fetches the manifest on every lookup, so a lookup never answers with a
/// version older than what the catalog currently publishes.
pub(crate) struct HttpSpecSource {
    manifest_url: Url,
    client: Client,
}

impl HttpSpecSource {
    pub(crate) fn with_manifest_url(manifest_url: &str) -> Result<HttpSpecSource, Error> {
        Ok(HttpSpecSource {
            manifest_url: Url::parse(manifest_url)?,
            client: Client::new(),
        })
    }

    async fn manifest(&self) -> Result<Vec<ManifestEntry>, Error> {
        let res = self.client.get(self.manifest_url.clone()).send().await?;

        let res = apireq::check_status(res).await?;

        Ok(res.json().await?)
    }
}

#[async_trait]
impl SpecSource for HttpSpecSource {
    async fn get_latest_version(&self, model_id: &str) -> Result<String, Error> {
        let entries = self.manifest().await?;

        tracing::debug!(model_id, entries = entries.len(), "fetched catalog manifest");

        Ok(latest_in(&entries, model_id)?)
    }
}
