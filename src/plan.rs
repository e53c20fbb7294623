//! One reconciliation pass: resolve the requested versions, index the hub
//! listing and decide what to sync.

use std::borrow::Cow;

use thiserror::Error;

use crate::backends::{self, HubLister, SpecSource};
use crate::hub::{self, RawHubContent, RegistryIndex, SyncDecision};
use crate::request::ModelRequest;
use crate::resolver::{self, VersionResolver};

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("failed to list hub contents: {0}")]
    Listing(#[source] backends::Error),
}

/// Where the hub's current contents come from.
pub(crate) enum Listing<'l> {
    /// A listing already in hand.
    Raw(&'l [RawHubContent]),
    /// Ask the hub.
    Fetch(&'l dyn HubLister),
}

impl<'l> Listing<'l> {
    async fn contents(&self) -> Result<Cow<'l, [RawHubContent]>, Error> {
        match self {
            Listing::Raw(raw) => Ok(Cow::Borrowed(*raw)),
            Listing::Fetch(lister) => lister
                .list_models()
                .await
                .map(Cow::Owned)
                .map_err(Error::Listing),
        }
    }
}

/// A request whose latest version could not be determined.
#[derive(Debug)]
pub(crate) struct Unresolved {
    pub ordinal: usize,
    pub request: ModelRequest,
    pub error: resolver::Error,
}

#[derive(Debug, Default)]
pub(crate) struct Plan {
    /// Requests to sync, in submission order.
    pub decisions: Vec<SyncDecision>,
    /// Requests left out of reconciliation, in submission order.
    pub unresolved: Vec<Unresolved>,
}

impl Plan {
    pub(crate) fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Decides which of `requests` must be synced into the hub described by `listing`.
///
/// Version lookups and the hub listing run concurrently. A request whose
/// version cannot be resolved is reported in [`Plan::unresolved`] and the
/// remaining requests are reconciled regardless, keeping their ordinals.
pub(crate) async fn reconcile(
    specs: &dyn SpecSource,
    requests: &[ModelRequest],
    listing: Listing<'_>,
) -> Result<Plan, Error> {
    let resolver = VersionResolver::new(specs);

    let (resolved, contents) =
        futures_util::join!(resolver.resolve_all(requests), listing.contents());

    let contents = contents?;

    let mut plan = Plan::default();
    let mut candidates = Vec::with_capacity(requests.len());

    for (ordinal, (request, result)) in requests.iter().zip(resolved).enumerate() {
        match result {
            Ok(resolved) => candidates.push((ordinal, resolved)),
            Err(error) => {
                tracing::warn!(ordinal, model = %request, %error, "could not resolve model version");

                plan.unresolved.push(Unresolved {
                    ordinal,
                    request: request.clone(),
                    error,
                });
            }
        }
    }

    let index = RegistryIndex::build(&contents);

    if index.is_empty() {
        tracing::info!(records = contents.len(), "hub holds no upstream-tagged models");
    }

    plan.decisions = hub::reconcile(candidates, &index);

    Ok(plan)
}
