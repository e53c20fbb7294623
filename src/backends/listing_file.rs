//! A hub listing that was fetched ahead of time and saved to disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::{Error, ErrorKind, HubLister};
use crate::hub::RawHubContent;

#[derive(Debug, Error)]
pub(crate) enum ListingError {
    #[error("failed to read hub listing {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("failed to parse hub listing {0}: {1}")]
    Parse(String, #[source] serde_json::Error),
}

impl From<ListingError> for Error {
    fn from(value: ListingError) -> Self {
        let kind = match &value {
            ListingError::Io(_, err) if err.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            ListingError::Io(..) | ListingError::Parse(..) => ErrorKind::UnexpectedResponse,
        };

        Error::from_source(kind, Box::new(value))
    }
}

/// Either the hub's own response document or just the array of summaries.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListingDocument {
    Response {
        #[serde(rename = "HubContentSummaries")]
        summaries: Vec<RawHubContent>,
    },
    Summaries(Vec<RawHubContent>),
}

impl From<ListingDocument> for Vec<RawHubContent> {
    fn from(value: ListingDocument) -> Self {
        match value {
            ListingDocument::Response { summaries } => summaries,
            ListingDocument::Summaries(summaries) => summaries,
        }
    }
}

pub(crate) fn parse_listing(raw: &str) -> Result<Vec<RawHubContent>, serde_json::Error> {
    let document: ListingDocument = serde_json::from_str(raw)?;

    Ok(document.into())
}

pub(crate) fn read_listing(path: &Path) -> Result<Vec<RawHubContent>, ListingError> {
    let display = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|e| ListingError::Io(display.clone(), e))?;

    parse_listing(&raw).map_err(|e| ListingError::Parse(display, e))
}

/// Reads the listing from disk on each call.
pub(crate) struct ListingFile {
    path: PathBuf,
}

impl ListingFile {
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> ListingFile {
        ListingFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl HubLister for ListingFile {
    async fn list_models(&self) -> Result<Vec<RawHubContent>, Error> {
        Ok(read_listing(&self.path)?)
    }
}
