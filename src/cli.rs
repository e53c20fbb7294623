use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use crate::backends::hub_api::HttpHub;
use crate::backends::listing_file::ListingFile;
use crate::backends::manifest::{HttpSpecSource, ManifestSpecSource};
use crate::backends::{HubLister, SpecSource};
use crate::config::Config;
use crate::request::{self, ModelRequest};
use crate::{die, ListingFormat, RequestedColorMode, SourceArgs};
use table::IntoTable;

pub(crate) mod hub;
pub(crate) mod list;
pub(crate) mod model;
pub(crate) mod plan;
pub(crate) mod table;

#[derive(Clone, Copy, strum_macros::Display)]
pub(crate) enum ColorMode {
    On,
    Off,
}

impl ColorMode {
    /// Returns whether ANSI color should be used
    /// If the user has specified a preference, this is honored. This preference
    /// can be specified through the command line or the "NO_COLOR" environment
    /// variable If the user hasn't stated a preference, color is enabled if
    /// stderr is a terminal.
    pub(crate) fn resolve_auto(cm: RequestedColorMode) -> ColorMode {
        match cm {
            RequestedColorMode::Auto => {
                let disable_color =
                    std::env::var_os("NO_COLOR").is_some() || !io::stderr().is_terminal();

                if disable_color {
                    ColorMode::Off
                } else {
                    ColorMode::On
                }
            }
            RequestedColorMode::On => ColorMode::On,
            RequestedColorMode::Off => ColorMode::Off,
        }
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn manifest_source(location: &str) -> Box<dyn SpecSource> {
    if is_url(location) {
        match HttpSpecSource::with_manifest_url(location) {
            Ok(source) => Box::new(source),
            Err(err) => die!("catalog manifest URL \"{}\" is invalid: {}", location, err),
        }
    } else {
        match ManifestSpecSource::from_path(Path::new(location)) {
            Ok(source) => Box::new(source),
            Err(err) => die!("{}", err),
        }
    }
}

/// The upstream catalog, from `--manifest` or the config file.
pub(crate) fn spec_source(config: &Config, sources: &SourceArgs) -> Box<dyn SpecSource> {
    if let Some(location) = &sources.manifest {
        return manifest_source(location);
    }

    let catalog = &config.catalog;

    match (&catalog.manifest_url, &catalog.manifest_path) {
        (Some(url), _) => manifest_source(url),
        (None, Some(path)) => match ManifestSpecSource::from_path(path) {
            Ok(source) => Box::new(source),
            Err(err) => die!("{}", err),
        },
        (None, None) => die!(
            "no upstream catalog is configured, set catalog.manifest_url in the config or pass --manifest"
        ),
    }
}

/// The hub's REST API, from `--hub` and the config file.
pub(crate) fn http_hub(config: &Config, sources: &SourceArgs) -> HttpHub {
    let hub_name = match sources.hub.as_ref().or(config.hub.name.as_ref()) {
        Some(name) => name,
        None => die!("no hub is configured, set hub.name in the config or pass --hub"),
    };

    let api_base = match &config.hub.api_base {
        Some(api_base) => api_base,
        None => die!("the hub API base is not configured, set hub.api_base in the config"),
    };

    match HttpHub::with_api_base(api_base.as_str(), hub_name) {
        Ok(hub) => hub,
        Err(err) => die!("hub API base \"{}\" is invalid: {}", api_base, err),
    }
}

/// A saved listing if one was given, the live hub otherwise.
pub(crate) fn hub_lister(
    config: &Config,
    sources: &SourceArgs,
    listing: Option<&PathBuf>,
) -> Box<dyn HubLister> {
    match listing {
        Some(path) => Box::new(ListingFile::new(path)),
        None => Box::new(http_hub(config, sources)),
    }
}

/// Collects requests from positional model specs followed by the models file.
pub(crate) fn requested_models(specs: &[String], models_file: Option<&PathBuf>) -> Vec<ModelRequest> {
    let mut requests = Vec::new();

    for spec in specs {
        match spec.parse::<ModelRequest>() {
            Ok(request) => requests.push(request),
            Err(err) => die!("{}", err),
        }
    }

    if let Some(path) = models_file {
        match request::read_model_list(path) {
            Ok(models) => requests.extend(models),
            Err(err) => die!("{}", err),
        }
    }

    if requests.is_empty() {
        die!("no models were requested, pass model ids or --models FILE");
    }

    requests
}

pub(crate) fn format_output<O: IntoTable + serde::Serialize>(object: O, format: ListingFormat) {
    match format {
        ListingFormat::Json => match serde_json::to_string_pretty(&object) {
            Ok(output) => println!("{}", output),
            Err(err) => die!("failed to serialize output: {}", err),
        },
        ListingFormat::Table => {
            let tab = object.into_table();

            print!("{}", tab);
        }
        ListingFormat::HeaderlessTable => {
            let mut tab = object.into_table();

            tab.print_header(false);

            print!("{}", tab);
        }
    }
}
