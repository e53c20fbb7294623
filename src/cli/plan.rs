use serde::Serialize;

use super::table::{Column, Table};
use super::{format_output, http_hub, requested_models, spec_source};
use crate::backends::dry_run::DryRun;
use crate::backends::listing_file::read_listing;
use crate::color::{MaybePaint, SYNC_FAILED, SYNC_OK};
use crate::config::Config;
use crate::dispatch::{dispatch, SyncOutcome};
use crate::hub::SyncDecision;
use crate::plan::{self, Listing, Plan};
use crate::utils::errors::DEFAULT_EXIT_CODE;
use crate::{die, error, warn, PlanArgs, SyncArgs};

impl From<Vec<SyncDecision>> for Table {
    fn from(decisions: Vec<SyncDecision>) -> Self {
        let mut tab = Table::new(vec![
            Column::right("ORDINAL"),
            Column::left("MODEL"),
            Column::left("VERSION"),
            Column::left("REASON"),
        ]);

        for decision in decisions {
            tab.add_row(vec![
                decision.ordinal.to_string(),
                decision.request.model_id,
                decision.request.version,
                decision.reason.to_string(),
            ]);
        }

        tab
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
enum SyncStatus {
    Synced,
    Failed,
    DryRun,
}

#[derive(Serialize, Debug)]
struct SyncedModel {
    ordinal: usize,
    model_id: String,
    version: String,
    status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SyncedModel {
    fn new(outcome: SyncOutcome, dry_run: bool) -> SyncedModel {
        let (status, error) = match (&outcome.result, dry_run) {
            (Ok(()), false) => (SyncStatus::Synced, None),
            (Ok(()), true) => (SyncStatus::DryRun, None),
            (Err(err), _) => (SyncStatus::Failed, Some(err.to_string())),
        };

        SyncedModel {
            ordinal: outcome.decision.ordinal,
            model_id: outcome.decision.request.model_id,
            version: outcome.decision.request.version,
            status,
            error,
        }
    }
}

impl From<Vec<SyncedModel>> for Table {
    fn from(models: Vec<SyncedModel>) -> Self {
        let mut tab = Table::new(vec![
            Column::right("ORDINAL"),
            Column::left("MODEL"),
            Column::left("VERSION"),
            Column::left("STATUS"),
        ]);

        for model in models {
            tab.add_row(vec![
                model.ordinal.to_string(),
                model.model_id,
                model.version,
                model.status.to_string(),
            ]);
        }

        tab
    }
}

/// Builds the plan for the requested models, aborting on unresolved requests
/// unless `--skip-unresolved` was given.
async fn build_plan(config: &Config, args: &PlanArgs) -> Plan {
    let requests = requested_models(&args.models, args.models_file.as_ref());

    let specs = spec_source(config, &args.sources);

    let saved = args.listing.as_ref().map(|path| match read_listing(path) {
        Ok(raw) => raw,
        Err(err) => die!("{}", err),
    });

    let hub;
    let listing = match &saved {
        Some(raw) => Listing::Raw(raw),
        None => {
            hub = http_hub(config, &args.sources);
            Listing::Fetch(&hub)
        }
    };

    let plan = match plan::reconcile(&*specs, &requests, listing).await {
        Ok(plan) => plan,
        Err(err) => die!("{}", err),
    };

    if plan.is_complete() {
        return plan;
    }

    for unresolved in &plan.unresolved {
        if args.skip_unresolved {
            warn!(
                "skipping \"{}\" (#{}): {}",
                unresolved.request, unresolved.ordinal, unresolved.error
            );
        } else {
            error!("{}", unresolved.error);
        }
    }

    if !args.skip_unresolved {
        die!(
            "{} of {} requested models could not be resolved, pass --skip-unresolved to sync the rest",
            plan.unresolved.len(),
            requests.len()
        );
    }

    plan
}

pub(crate) async fn plan_cmd(config: &Config, args: &PlanArgs) {
    let plan = build_plan(config, args).await;

    format_output(plan.decisions, args.format);
}

pub(crate) async fn sync_cmd(config: &Config, args: &SyncArgs) {
    let plan = build_plan(config, &args.plan).await;

    if plan.decisions.is_empty() {
        eprintln!("{}", SYNC_OK.maybe_paint("hub is up to date"));
        return;
    }

    let dry_run = args.dry_run || config.sync.dry_run;
    let max_concurrency = args
        .max_concurrency
        .unwrap_or(config.sync.max_concurrency);

    let outcomes = if dry_run {
        dispatch(&DryRun, plan.decisions, max_concurrency).await
    } else {
        let hub = http_hub(config, &args.plan.sources);

        dispatch(&hub, plan.decisions, max_concurrency).await
    };

    let total = outcomes.len();
    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();

    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            error!(
                "failed to sync \"{}\" (#{}): {}",
                outcome.decision.request, outcome.decision.ordinal, err
            );
        }
    }

    let synced: Vec<SyncedModel> = outcomes
        .into_iter()
        .map(|outcome| SyncedModel::new(outcome, dry_run))
        .collect();

    format_output(synced, args.plan.format);

    if failed > 0 {
        let summary = format!("{} of {} models failed to sync", failed, total);

        eprintln!("{}", SYNC_FAILED.maybe_paint(summary.as_str()));

        std::process::exit(DEFAULT_EXIT_CODE);
    }

    let summary = if dry_run {
        format!("{} models would be synced", total)
    } else {
        format!("synced {} models", total)
    };

    eprintln!("{}", SYNC_OK.maybe_paint(summary.as_str()));
}
