use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dispatch::DEFAULT_MAX_CONCURRENCY;
use crate::warn;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("failed to read config {0}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to reserialize config: {0}")]
    Reserialize(#[from] toml::ser::Error),
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub(crate) struct Hub {
    pub name: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub(crate) struct Catalog {
    pub manifest_url: Option<String>,
    pub manifest_path: Option<PathBuf>,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub(crate) struct SyncSettings {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            dry_run: false,
        }
    }
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub(crate) struct Config {
    #[serde(default)]
    pub hub: Hub,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub sync: SyncSettings,
}

fn get_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME");

    if let Some(home) = home {
        let home = PathBuf::from(home);

        const USER_PATHS: [&str; 2] = [".config/hubsync/config.toml", ".hubsync.toml"];

        for &path in USER_PATHS.iter() {
            let fullpath = home.join(path);

            if fullpath.exists() {
                return Some(fullpath);
            }
        }
    }

    let system_config = PathBuf::from("/etc/hubsync.toml");

    if system_config.exists() {
        Some(system_config)
    } else {
        None
    }
}

fn extra_fields_helper<'a>(
    path: &mut Vec<&'a str>,
    user_config: &'a toml::Table,
    config: &'a toml::Table,
    extra: &mut Vec<String>,
) {
    for (user_key, user_value) in user_config {
        path.push(user_key);

        match config.get(user_key) {
            Some(toml::Value::Table(config_value)) => {
                if let toml::Value::Table(user_value) = user_value {
                    extra_fields_helper(path, user_value, config_value, extra);
                }
            }
            Some(_) => {}
            None => extra.push(path.join(".")),
        }

        path.pop();
    }
}

/// Dotted paths of the keys in `raw_config` that `config` does not know about.
fn extra_fields(config: &Config, raw_config: &str) -> Result<Vec<String>, Error> {
    let user_config: toml::Table = toml::from_str(raw_config)?;

    let config: toml::Table = toml::from_str(&toml::to_string(config)?)?;

    let mut path = Vec::new();
    let mut extra = Vec::new();

    extra_fields_helper(&mut path, &user_config, &config, &mut extra);

    Ok(extra)
}

pub(crate) fn parse_config(raw_config: &str) -> Result<Config, Error> {
    let config: Config = toml::from_str(raw_config)?;

    for key in extra_fields(&config, raw_config)? {
        warn!("config contains extraneous key \"{}\", ignoring", key);
    }

    Ok(config)
}

pub(crate) fn read_config(config: Option<&Path>) -> Result<Config, Error> {
    let config_path = config.map(Path::to_path_buf).or_else(get_config_path);

    if let Some(path) = config_path {
        tracing::debug!(path = %path.display(), "reading config");

        let raw_config = std::fs::read_to_string(&path)
            .map_err(|e| Error::Read(path.display().to_string(), e))?;

        parse_config(&raw_config)
    } else {
        Ok(Config::default())
    }
}
