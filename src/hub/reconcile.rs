//! Decides which requested models have to be synced into the hub.

use core::fmt;
use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use super::content::HubContent;
use super::index::RegistryIndex;
use crate::request::ModelRequest;
use crate::version;

/// Why a request has to be synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum SyncReason {
    /// No upstream-tagged entry for the model id exists in the hub.
    Missing,
    /// The hub holds an older version.
    Outdated { hub_version: String },
    /// The hub entry has no usable version to compare against.
    HubVersionUnknown,
    /// The requested version cannot be compared.
    RequestedVersionUnknown,
}

impl fmt::Display for SyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncReason::Missing => write!(f, "missing"),
            SyncReason::Outdated { hub_version } => write!(f, "outdated ({})", hub_version),
            SyncReason::HubVersionUnknown => write!(f, "hub version unknown"),
            SyncReason::RequestedVersionUnknown => write!(f, "requested version unknown"),
        }
    }
}

/// A request that has to be synced, together with its position in the
/// originally submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SyncDecision {
    pub ordinal: usize,
    pub request: ModelRequest,
    pub reason: SyncReason,
}

fn sync_reason(request: &ModelRequest, index: &RegistryIndex) -> Option<SyncReason> {
    if !index.contains(&request.model_id) {
        return Some(SyncReason::Missing);
    }

    let model_id = &request.model_id;

    // Reported as the hub recorded it, not in normalized form.
    let hub_version = match (
        index.version_of(model_id),
        index.get(model_id).and_then(HubContent::native_version),
    ) {
        (Some(_), Some(raw)) => raw,
        _ => return Some(SyncReason::HubVersionUnknown),
    };

    // The hub version always parses here, so `None` means the request's didn't.
    match version::compare(&request.version, hub_version) {
        None => Some(SyncReason::RequestedVersionUnknown),
        Some(Ordering::Greater) => Some(SyncReason::Outdated {
            hub_version: hub_version.to_string(),
        }),
        // The hub already has this version or a newer one. Never downgrade.
        Some(Ordering::Equal | Ordering::Less) => None,
    }
}

/// Walks `requests` in order and keeps those the hub does not satisfy.
///
/// Each request comes with its ordinal in the submitted batch; ordinals are
/// passed through untouched, so the output is the input with the satisfied
/// requests filtered out.
pub(crate) fn reconcile<I>(requests: I, index: &RegistryIndex) -> Vec<SyncDecision>
where
    I: IntoIterator<Item = (usize, ModelRequest)>,
{
    let mut decisions = Vec::new();
    let mut considered = 0usize;

    for (ordinal, request) in requests {
        considered += 1;

        match sync_reason(&request, index) {
            Some(reason) => {
                debug!(ordinal, model = %request, %reason, "sync required");

                decisions.push(SyncDecision {
                    ordinal,
                    request,
                    reason,
                });
            }
            None => {
                let hub_entry = index.get(&request.model_id).map(|c| c.name.as_str());

                debug!(ordinal, model = %request, hub_entry, "hub is up to date");
            }
        }
    }

    tracing::info!(
        considered,
        to_sync = decisions.len(),
        indexed = index.len(),
        "reconciled requested models against hub"
    );

    decisions
}
