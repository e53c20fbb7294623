//! Hands sync decisions to the executor.
//!
//! Decisions are independent of each other, so they are dispatched
//! concurrently, at most `max_concurrency` at a time. A failed sync does not
//! stop the others. Each outcome carries the decision's ordinal so it can be
//! traced back to the submitted request.

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::backends::{self, SyncExecutor};
use crate::hub::SyncDecision;

pub(crate) const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Debug)]
pub(crate) struct SyncOutcome {
    pub decision: SyncDecision,
    pub result: Result<(), backends::Error>,
}

impl SyncOutcome {
    pub(crate) fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Syncs every decision and returns the outcomes ordered by ordinal.
pub(crate) async fn dispatch(
    executor: &dyn SyncExecutor,
    decisions: Vec<SyncDecision>,
    max_concurrency: usize,
) -> Vec<SyncOutcome> {
    let max_concurrency = max_concurrency.max(1);

    let mut outcomes: Vec<SyncOutcome> = stream::iter(decisions)
        .map(|decision| async move {
            debug!(ordinal = decision.ordinal, model = %decision.request, "sync started");

            let result = executor.sync_model(&decision).await;

            match &result {
                Ok(()) => debug!(ordinal = decision.ordinal, model = %decision.request, "sync finished"),
                Err(err) => warn!(
                    ordinal = decision.ordinal,
                    model = %decision.request,
                    error = %err,
                    "sync failed"
                ),
            }

            SyncOutcome { decision, result }
        })
        .buffer_unordered(max_concurrency)
        .collect()
        .await;

    outcomes.sort_by_key(|o| o.decision.ordinal);

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ErrorKind;
    use crate::hub::reconcile::SyncReason;
    use crate::request::ModelRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records calls, fails for one model id, and tracks peak concurrency.
    struct RecordingExecutor {
        calls: Mutex<Vec<(ModelRequest, usize)>>,
        fail_for: Option<String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl RecordingExecutor {
        fn new(fail_for: Option<&str>) -> RecordingExecutor {
            RecordingExecutor {
                calls: Mutex::new(Vec::new()),
                fail_for: fail_for.map(str::to_string),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SyncExecutor for RecordingExecutor {
        async fn sync_model(&self, decision: &SyncDecision) -> Result<(), backends::Error> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            // Later ordinals finish first.
            let delay = 5 * (10 - decision.ordinal.min(10)) as u64;
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.calls
                .lock()
                .unwrap()
                .push((decision.request.clone(), decision.ordinal));

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match &self.fail_for {
                Some(id) if *id == decision.request.model_id => {
                    Err(backends::Error::from_kind(ErrorKind::InternalError))
                }
                _ => Ok(()),
            }
        }
    }

    fn decisions(ids: &[(usize, &str)]) -> Vec<SyncDecision> {
        ids.iter()
            .map(|(ordinal, id)| SyncDecision {
                ordinal: *ordinal,
                request: ModelRequest::new(*id, "1.0.0"),
                reason: SyncReason::Missing,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_every_decision_is_dispatched_with_its_ordinal() {
        let executor = RecordingExecutor::new(None);

        let outcomes = dispatch(&executor, decisions(&[(0, "a"), (2, "c"), (5, "f")]), 4).await;

        let ordinals: Vec<usize> = outcomes.iter().map(|o| o.decision.ordinal).collect();
        assert_eq!(ordinals, vec![0, 2, 5]);
        assert!(outcomes.iter().all(SyncOutcome::succeeded));

        let mut calls = executor.calls.lock().unwrap().clone();
        calls.sort_by_key(|(_, ordinal)| *ordinal);
        assert_eq!(
            calls,
            vec![
                (ModelRequest::new("a", "1.0.0"), 0),
                (ModelRequest::new("c", "1.0.0"), 2),
                (ModelRequest::new("f", "1.0.0"), 5),
            ]
        );
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let executor = RecordingExecutor::new(Some("b"));

        let outcomes = dispatch(&executor, decisions(&[(0, "a"), (1, "b"), (2, "c")]), 2).await;

        let succeeded: Vec<bool> = outcomes.iter().map(SyncOutcome::succeeded).collect();
        assert_eq!(succeeded, vec![true, false, true]);
        assert_eq!(executor.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let executor = RecordingExecutor::new(None);

        let many: Vec<(usize, String)> = (0..8).map(|i| (i, format!("m{}", i))).collect();
        let many: Vec<(usize, &str)> = many.iter().map(|(i, id)| (*i, id.as_str())).collect();

        let outcomes = dispatch(&executor, decisions(&many), 3).await;

        assert_eq!(outcomes.len(), 8);
        assert!(executor.peak.load(Ordering::SeqCst) <= 3);
        assert!(executor.peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_dispatches() {
        let executor = RecordingExecutor::new(None);

        let outcomes = dispatch(&executor, decisions(&[(0, "a")]), 0).await;

        assert_eq!(outcomes.len(), 1);
    }
}
