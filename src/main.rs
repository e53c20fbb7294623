mod backends;
mod cli;
mod color;
mod config;
mod dispatch;
mod hub;
mod plan;
mod request;
mod resolver;
mod utils;
mod version;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use cli::{hub::hub_cmd, list::list_cmd, model, plan::plan_cmd, plan::sync_cmd, ColorMode};
use tracing_subscriber::EnvFilter;

#[derive(
    Default, Clone, Copy, ValueEnum, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum RequestedColorMode {
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Parser)]
#[command(name = "hubsync")]
#[command(
    about = "Keep a private curated model hub in step with an upstream model catalog",
    version = "0.0.1"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, global = true, default_value_t = RequestedColorMode::default())]
    color: RequestedColorMode,
    /// Read the configuration from this file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log more (repeat for debug output); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which models have to be synced into the hub
    Plan(PlanArgs),
    /// Sync every model the hub is missing or holds an older version of
    Sync(SyncArgs),
    /// List the models in the hub
    List(ListArgs),
    /// Resolve requested models to concrete catalog versions
    Resolve(ResolveArgs),
    /// Describe a model in the hub
    Describe(ModelArgs),
    /// Delete a model from the hub
    Delete(ModelArgs),
    /// Create, describe or delete the hub itself
    Hub(HubArgs),
}

/// Where to find the hub and the upstream catalog. Each overrides the config file.
#[derive(Args, Default)]
pub(crate) struct SourceArgs {
    /// Name of the hub
    #[arg(long)]
    hub: Option<String>,
    /// URL or path of the upstream catalog manifest
    #[arg(long)]
    manifest: Option<String>,
}

#[derive(Args)]
pub(crate) struct PlanArgs {
    /// Models to carry, as MODEL_ID or MODEL_ID@VERSION ("*" for the latest)
    models: Vec<String>,
    /// Read requested models from a JSON file
    #[arg(short = 'm', long = "models")]
    models_file: Option<PathBuf>,
    /// Use a saved hub listing instead of asking the hub
    #[arg(long)]
    listing: Option<PathBuf>,
    /// Leave out models whose latest version cannot be resolved instead of aborting
    #[arg(long)]
    skip_unresolved: bool,
    #[command(flatten)]
    sources: SourceArgs,
    /// Output the listing with the specified format
    #[arg(short, long, default_value_t = ListingFormat::default())]
    format: ListingFormat,
}

#[derive(Args)]
pub(crate) struct SyncArgs {
    #[command(flatten)]
    plan: PlanArgs,
    /// Only report what would be synced
    #[arg(long)]
    dry_run: bool,
    /// Maximum number of models synced at the same time
    #[arg(long)]
    max_concurrency: Option<usize>,
}

/// Output formats
#[derive(
    ValueEnum, Default, Clone, Copy, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ListingFormat {
    /// Format the output as a table
    #[default]
    Table,
    /// Format the output as JSON
    Json,
    /// Format the output as a table without a header
    HeaderlessTable,
}

#[derive(Args)]
pub(crate) struct ListArgs {
    /// Include entries that were not copied from the upstream catalog
    #[arg(short, long)]
    all: bool,
    /// Read a saved hub listing instead of asking the hub
    #[arg(long)]
    listing: Option<PathBuf>,
    #[command(flatten)]
    sources: SourceArgs,
    /// Output the listing with the specified format
    #[arg(short, long, default_value_t = ListingFormat::default())]
    format: ListingFormat,
}

#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Models to resolve, as MODEL_ID or MODEL_ID@VERSION
    #[arg(required = true)]
    models: Vec<String>,
    #[command(flatten)]
    sources: SourceArgs,
    /// Output the listing with the specified format
    #[arg(short, long, default_value_t = ListingFormat::default())]
    format: ListingFormat,
}

#[derive(Args)]
pub(crate) struct ModelArgs {
    /// Name of the model in the hub
    model: String,
    /// Version of the model; the catalog's latest if omitted or "*"
    version: Option<String>,
    #[command(flatten)]
    sources: SourceArgs,
}

#[derive(Args)]
pub(crate) struct HubArgs {
    #[command(subcommand)]
    command: HubCommands,
}

#[derive(Subcommand)]
pub(crate) enum HubCommands {
    /// Create the hub
    Create(CreateHubArgs),
    /// Describe the hub
    Describe(HubTargetArgs),
    /// Delete the hub
    Delete(HubTargetArgs),
}

#[derive(Args)]
pub(crate) struct CreateHubArgs {
    /// Description of the hub
    #[arg(long)]
    description: String,
    /// Name shown for the hub instead of its identifier
    #[arg(long)]
    display_name: Option<String>,
    /// Keyword the hub can be found by (repeatable)
    #[arg(long = "search-keyword")]
    search_keywords: Vec<String>,
    /// Bucket to store the hub's model artifacts in
    #[arg(long)]
    bucket: Option<String>,
    /// Tag the hub with KEY=VALUE (repeatable)
    #[arg(long = "tag", value_parser = cli::hub::parse_tag)]
    tags: Vec<(String, String)>,
    #[command(flatten)]
    sources: SourceArgs,
}

#[derive(Args)]
pub(crate) struct HubTargetArgs {
    #[command(flatten)]
    sources: SourceArgs,
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let color = ColorMode::resolve_auto(cli.color);
    color::configure_color(color);

    init_tracing(cli.verbose);

    let config = match config::read_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => crate::die!("{}", err),
    };

    match &cli.command {
        Commands::Plan(args) => plan_cmd(&config, args).await,
        Commands::Sync(args) => sync_cmd(&config, args).await,
        Commands::List(args) => list_cmd(&config, args).await,
        Commands::Resolve(args) => model::resolve_cmd(&config, args).await,
        Commands::Describe(args) => model::describe_cmd(&config, args).await,
        Commands::Delete(args) => model::delete_cmd(&config, args).await,
        Commands::Hub(args) => hub_cmd(&config, args).await,
    }
}
