use crate::backends::{HubClient, HubSettings};
use crate::config::Config;
use crate::{die, CreateHubArgs, HubArgs, HubCommands, HubTargetArgs};

use super::http_hub;

/// Parses a `KEY=VALUE` hub tag.
pub(crate) fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("tag \"{}\" is not of the form KEY=VALUE", raw)),
    }
}

fn print_document(document: &serde_json::Value) {
    match serde_json::to_string_pretty(document) {
        Ok(output) => println!("{}", output),
        Err(err) => die!("failed to serialize output: {}", err),
    }
}

async fn create_cmd(config: &Config, args: &CreateHubArgs) {
    let hub = http_hub(config, &args.sources);

    let settings = HubSettings {
        description: args.description.clone(),
        display_name: args.display_name.clone(),
        search_keywords: args.search_keywords.clone(),
        bucket_name: args.bucket.clone(),
        tags: args.tags.clone(),
    };

    match hub.create_hub(&settings).await {
        Ok(created) => {
            tracing::info!(hub = hub.hub_name(), "created hub");

            print_document(&created);
        }
        Err(err) => die!("failed to create hub \"{}\": {}", hub.hub_name(), err),
    }
}

async fn describe_cmd(config: &Config, args: &HubTargetArgs) {
    let hub = http_hub(config, &args.sources);

    match hub.describe_hub().await {
        Ok(document) => print_document(&document),
        Err(err) => die!("failed to describe hub \"{}\": {}", hub.hub_name(), err),
    }
}

async fn delete_cmd(config: &Config, args: &HubTargetArgs) {
    let hub = http_hub(config, &args.sources);

    if let Err(err) = hub.delete_hub().await {
        die!("failed to delete hub \"{}\": {}", hub.hub_name(), err);
    }

    eprintln!("deleted hub \"{}\"", hub.hub_name());
}

pub(crate) async fn hub_cmd(config: &Config, args: &HubArgs) {
    match &args.command {
        HubCommands::Create(args) => create_cmd(config, args).await,
        HubCommands::Describe(args) => describe_cmd(config, args).await,
        HubCommands::Delete(args) => delete_cmd(config, args).await,
    }
}
