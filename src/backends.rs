//! Interfaces to the systems reconciliation depends on but does not own.
//!
//! Three collaborators surround the reconciliation core:
//! - [`SpecSource`]: the upstream catalog, asked for the newest version of a model.
//! - [`HubLister`]: produces the raw listing of a hub's model contents. [`HubClient`]
//!   extends it with the per-model describe and delete calls and with
//!   creating, describing and deleting the hub itself.
//! - [`SyncExecutor`]: copies one model into the hub. It is handed one
//!   [`SyncDecision`] at a time and may be called concurrently.
//!
//! ## Error Handling
//!
//! Each backend has its own error type. These are wrapped in [`Error`], and
//! [`ErrorKind`] says which category of failure occurred so that callers can
//! tell, e.g., a missing model apart from an unreachable service.

pub(crate) mod apireq;
pub(crate) mod dry_run;
pub(crate) mod hub_api;
pub(crate) mod listing_file;
pub(crate) mod manifest;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;

use crate::hub::{RawHubContent, SyncDecision};

/// General categories of errors that can be returned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// Failed to connect to the service.
    Connection,
    /// A request timed out.
    TimedOut,
    /// The requested model, version or hub does not exist.
    NotFound,
    /// The request was rejected as malformed or not permitted. This often
    /// corresponds to HTTP status codes in the 400s.
    BadRequest,
    /// The service encountered an error. This often corresponds to HTTP
    /// status codes in the 500s.
    InternalError,
    /// A response or local file could not be read or violated the
    /// assumptions of the client.
    UnexpectedResponse,
    /// An error that does not fit into any of the other categories.
    UnspecifiedError,
}

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub(crate) fn from_kind(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }

    pub(crate) fn from_source(kind: ErrorKind, source: Box<dyn StdError + Send + Sync>) -> Error {
        Error {
            kind,
            source: Some(source),
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Connection => "failed to connect to the service",
            ErrorKind::TimedOut => "request timed out",
            ErrorKind::NotFound => "the requested resource was not found",
            ErrorKind::BadRequest => "the request was bad or malformed",
            ErrorKind::InternalError => "the service encountered an internal error",
            ErrorKind::UnexpectedResponse => "response was unexpected or malformed",
            ErrorKind::UnspecifiedError => "an unspecified error occurred",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message(), source),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}

/// Description of a single hub model, as returned by [`HubClient::describe_model`].
#[derive(Debug, Clone, Serialize)]
pub(crate) struct HubContentDescription {
    pub name: String,
    pub version: String,
    /// The full document returned by the hub.
    pub document: Value,
}

/// The upstream catalog.
#[async_trait]
pub(crate) trait SpecSource: Send + Sync {
    /// Returns the newest version the catalog lists for `model_id`. Fails with
    /// [`ErrorKind::NotFound`] when the catalog has no record of the model.
    async fn get_latest_version(&self, model_id: &str) -> Result<String, Error>;
}

/// Produces a hub's contents.
#[async_trait]
pub(crate) trait HubLister: Send + Sync {
    /// Lists every model entry in the hub, in the order the hub returns them.
    async fn list_models(&self) -> Result<Vec<RawHubContent>, Error>;
}

/// Settings for a new hub.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct HubSettings {
    pub description: String,
    pub display_name: Option<String>,
    pub search_keywords: Vec<String>,
    /// Bucket holding the hub's model artifacts. Left to the hub if unset.
    pub bucket_name: Option<String>,
    pub tags: Vec<(String, String)>,
}

/// Hub and per-model operations.
#[async_trait]
pub(crate) trait HubClient: HubLister {
    async fn create_hub(&self, settings: &HubSettings) -> Result<Value, Error>;

    /// The hub's own description document.
    async fn describe_hub(&self) -> Result<Value, Error>;

    async fn delete_hub(&self) -> Result<(), Error>;

    async fn describe_model(
        &self,
        name: &str,
        version: &str,
    ) -> Result<HubContentDescription, Error>;

    async fn delete_model(&self, name: &str, version: &str) -> Result<(), Error>;
}

/// Copies one upstream model into the hub.
#[async_trait]
pub(crate) trait SyncExecutor: Send + Sync {
    async fn sync_model(&self, decision: &SyncDecision) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_source() {
        let err = Error::from_source(
            ErrorKind::NotFound,
            "model \"x\" is not in the catalog".into(),
        );

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "the requested resource was not found: model \"x\" is not in the catalog"
        );
        assert!(err.source().is_some());

        let err = Error::from_kind(ErrorKind::TimedOut);
        assert_eq!(err.to_string(), "request timed out");
        assert!(err.source().is_none());
    }
}
