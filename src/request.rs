//! Model requests: which upstream model the hub should carry, and at which version.
//!
//! On the command line a request is written as a "model spec":
//! ```text
//! <model spec> := <model id> | <model id> "@" <version>
//! ```
//! A missing version, or the wildcard `*`, asks for whatever the upstream
//! catalog reports as its newest version at the time of reconciliation.

use core::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Version marker meaning "the newest version the catalog knows about".
pub(crate) const LATEST_VERSION_WILDCARD: &str = "*";

#[derive(Error, Debug)]
pub(crate) enum ParseError {
    #[error("model spec \"{0}\" has an empty model id")]
    EmptyModelId(String),
    #[error("failed to read model list {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("failed to parse model list {0}: {1}")]
    Json(String, #[source] serde_json::Error),
}

fn latest_wildcard() -> String {
    LATEST_VERSION_WILDCARD.to_string()
}

/// An explicit `null` version means the same as leaving the key out.
fn version_or_latest<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(latest_wildcard))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) struct ModelRequest {
    pub model_id: String,
    #[serde(default = "latest_wildcard", deserialize_with = "version_or_latest")]
    pub version: String,
}

impl ModelRequest {
    pub(crate) fn new<S: Into<String>, V: Into<String>>(model_id: S, version: V) -> ModelRequest {
        ModelRequest {
            model_id: model_id.into(),
            version: version.into(),
        }
    }

    pub(crate) fn latest<S: Into<String>>(model_id: S) -> ModelRequest {
        Self::new(model_id, LATEST_VERSION_WILDCARD)
    }

    /// True if the version still has to be looked up in the catalog.
    pub(crate) fn is_latest(&self) -> bool {
        let version = self.version.trim();

        version.is_empty() || version == LATEST_VERSION_WILDCARD
    }

    pub(crate) fn with_version<V: Into<String>>(&self, version: V) -> ModelRequest {
        Self::new(self.model_id.clone(), version)
    }
}

impl fmt::Display for ModelRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_latest() {
            write!(f, "{}@{}", self.model_id, LATEST_VERSION_WILDCARD)
        } else {
            write!(f, "{}@{}", self.model_id, self.version)
        }
    }
}

impl FromStr for ModelRequest {
    type Err = ParseError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (model_id, version) = match spec.split_once('@') {
            Some((model_id, version)) => (model_id.trim(), version.trim()),
            None => (spec.trim(), LATEST_VERSION_WILDCARD),
        };

        if model_id.is_empty() {
            return Err(ParseError::EmptyModelId(spec.to_string()));
        }

        let version = if version.is_empty() {
            LATEST_VERSION_WILDCARD
        } else {
            version
        };

        Ok(ModelRequest::new(model_id, version))
    }
}

/// Reads a JSON array of `{"model_id": .., "version": ..}` objects.
pub(crate) fn read_model_list(path: &Path) -> Result<Vec<ModelRequest>, ParseError> {
    let display = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|e| ParseError::Io(display.clone(), e))?;

    parse_model_list(&raw).map_err(|e| ParseError::Json(display, e))
}

fn parse_model_list(raw: &str) -> Result<Vec<ModelRequest>, serde_json::Error> {
    serde_json::from_str(raw)
}
