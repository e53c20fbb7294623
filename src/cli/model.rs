use serde::Serialize;

use super::table::{Column, Table};
use super::{format_output, http_hub, requested_models, spec_source};
use crate::backends::{HubClient, HubContentDescription};
use crate::config::Config;
use crate::request::ModelRequest;
use crate::resolver::VersionResolver;
use crate::utils::errors::DEFAULT_EXIT_CODE;
use crate::{die, error, ModelArgs, ResolveArgs};

#[derive(Serialize, Debug, PartialEq)]
struct ResolvedModel {
    model_id: String,
    requested: String,
    resolved: String,
}

impl From<Vec<ResolvedModel>> for Table {
    fn from(models: Vec<ResolvedModel>) -> Self {
        let mut tab = Table::new(vec![
            Column::left("MODEL"),
            Column::left("REQUESTED"),
            Column::left("RESOLVED"),
        ]);

        for model in models {
            tab.add_row(vec![model.model_id, model.requested, model.resolved]);
        }

        tab
    }
}

fn requested_label(request: &ModelRequest) -> String {
    if request.is_latest() {
        "latest".to_string()
    } else {
        request.version.clone()
    }
}

pub(crate) async fn resolve_cmd(config: &Config, args: &ResolveArgs) {
    let requests = requested_models(&args.models, None);
    let specs = spec_source(config, &args.sources);

    let results = VersionResolver::new(&*specs).resolve_all(&requests).await;

    let mut resolved = Vec::with_capacity(requests.len());
    let mut failed = false;

    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(model) => resolved.push(ResolvedModel {
                model_id: model.model_id,
                requested: requested_label(request),
                resolved: model.version,
            }),
            Err(err) => {
                error!("{}", err);
                failed = true;
            }
        }
    }

    format_output(resolved, args.format);

    if failed {
        std::process::exit(DEFAULT_EXIT_CODE);
    }
}

/// The concrete version `args` refer to. A missing or wildcard version is
/// looked up in the upstream catalog.
async fn model_version(config: &Config, args: &ModelArgs) -> String {
    let request = match &args.version {
        Some(version) => ModelRequest::new(args.model.as_str(), version.as_str()),
        None => ModelRequest::latest(args.model.as_str()),
    };

    if !request.is_latest() {
        return request.version;
    }

    let specs = spec_source(config, &args.sources);

    match VersionResolver::new(&*specs).resolve(&request).await {
        Ok(resolved) => resolved.version,
        Err(err) => die!("{}", err),
    }
}

fn description_header(description: &HubContentDescription) -> String {
    format!("{} version {}", description.name, description.version)
}

pub(crate) async fn describe_cmd(config: &Config, args: &ModelArgs) {
    let hub = http_hub(config, &args.sources);
    let version = model_version(config, args).await;

    let description = match hub.describe_model(&args.model, &version).await {
        Ok(description) => description,
        Err(err) => die!(
            "failed to describe \"{}\" version {}: {}",
            args.model,
            version,
            err
        ),
    };

    eprintln!("{}", description_header(&description));

    match serde_json::to_string_pretty(&description.document) {
        Ok(document) => println!("{}", document),
        Err(err) => die!("failed to serialize output: {}", err),
    }
}

pub(crate) async fn delete_cmd(config: &Config, args: &ModelArgs) {
    let hub = http_hub(config, &args.sources);
    let version = model_version(config, args).await;

    if let Err(err) = hub.delete_model(&args.model, &version).await {
        die!(
            "failed to delete \"{}\" version {}: {}",
            args.model,
            version,
            err
        );
    }

    tracing::info!(model = %args.model, %version, "deleted hub model");

    eprintln!("deleted \"{}\" version {}", args.model, version);
}
