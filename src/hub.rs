//! The hub is a private, versioned registry that mirrors part of the upstream
//! model catalog. This module decides what has to be copied into it.
//!
//! A hub listing is a sequence of opaque records. Records that were copied
//! from the upstream catalog carry two search keywords recording where they
//! came from:
//! ```text
//! @jumpstart-model-id:<upstream model id>
//! @jumpstart-model-version:<upstream version>
//! ```
//! Everything else in the hub (models uploaded by hand, entries with partial
//! tags) is invisible to reconciliation.
//!
//! Reconciliation runs in three steps:
//! - [`content`] projects each raw record onto a [`HubContent`].
//! - [`index`] keeps the upstream-tagged entries, one per upstream model id.
//! - [`reconcile`] walks the requested models in order and keeps those that
//!   are missing from the index or whose indexed version is older.
//!
//! All three are pure and synchronous; the only I/O in a reconciliation pass
//! happens before (listing the hub, resolving wildcard versions) and after
//! (dispatching the sync decisions).

pub(crate) mod content;
pub(crate) mod index;
pub(crate) mod reconcile;
pub(crate) mod tags;

pub(crate) use content::{HubContent, RawHubContent};
pub(crate) use index::RegistryIndex;
pub(crate) use reconcile::{reconcile, SyncDecision};
pub(crate) use tags::UpstreamTag;
