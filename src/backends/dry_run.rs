use async_trait::async_trait;

use super::{Error, SyncExecutor};
use crate::hub::SyncDecision;

/// Reports what would be synced without touching the hub.
pub(crate) struct DryRun;

#[async_trait]
impl SyncExecutor for DryRun {
    async fn sync_model(&self, decision: &SyncDecision) -> Result<(), Error> {
        tracing::info!(
            ordinal = decision.ordinal,
            model = %decision.request,
            reason = %decision.reason,
            "dry run: skipping sync"
        );

        Ok(())
    }
}
