//! Configuration parsing and validation.
//!
//! This module contains three logical entities:
//!  * Snippets: single configuration files, holding a subset of configuration entries.
//!  * Inputs: configuration snippets merged, but not yet validated.
//!  * Settings: inputs with command-line overrides and defaults applied.

mod inputs;
mod snippets;

use crate::bootstrap::RequestConfig;
use crate::cli::CliOptions;
use failure::{Fallible, ResultExt};
use std::path::PathBuf;

/// Base directories for config snippets, lowest priority first.
static DEFAULT_DIRS: &[&str] = &["/usr/lib", "/run", "/etc"];

/// Default bootstrap service endpoint.
static DEFAULT_BOOTSTRAP_URL: &str = "http://localhost:8202/things/bootstrap";
static DEFAULT_RETRIES: &str = "5";
static DEFAULT_RETRY_DELAY_SECS: &str = "10";
static DEFAULT_AGENT_CONFIG_FILE: &str = "config.toml";

/// Runtime settings for a bootstrap run.
#[derive(Debug, Serialize)]
pub(crate) struct Settings {
    pub(crate) bootstrap: RequestConfig,
    pub(crate) agent_config_file: PathBuf,
}

impl Settings {
    /// Read config snippets and apply command-line overrides.
    pub(crate) fn assemble(cli: &CliOptions) -> Fallible<Self> {
        let dirs: Vec<PathBuf> = if cli.config_dirs.is_empty() {
            DEFAULT_DIRS.iter().map(|d| PathBuf::from(*d)).collect()
        } else {
            cli.config_dirs.clone()
        };
        let input = inputs::ConfigInput::read_config(&dirs)?;
        let settings = Self::from_input(input, cli);
        debug!(
            "runtime settings:\n{}",
            serde_json::to_string_pretty(&settings).context("failed to encode settings")?
        );

        Ok(settings)
    }

    /// Overlay command-line values on inputs and fill in defaults.
    fn from_input(input: inputs::ConfigInput, cli: &CliOptions) -> Self {
        let inputs::ConfigInput { bootstrap, agent } = input;

        let url = cli.url.clone().unwrap_or(bootstrap.url);
        let id = cli.id.clone().unwrap_or(bootstrap.id);
        let key = cli.key.clone().unwrap_or(bootstrap.key);
        let retries = cli.retries.clone().unwrap_or(bootstrap.retries);
        let retry_delay_secs = cli
            .retry_delay
            .clone()
            .unwrap_or(bootstrap.retry_delay_seconds);
        let skip_tls = cli.skip_tls.unwrap_or(bootstrap.skip_tls);
        let ca_file = match &cli.ca_file {
            Some(path) => Some(path.clone()),
            None if bootstrap.ca_file.is_empty() => None,
            None => Some(PathBuf::from(bootstrap.ca_file)),
        };
        let agent_config_file = match &cli.agent_config {
            Some(path) => path.clone(),
            None => PathBuf::from(or_default(agent.config_file, DEFAULT_AGENT_CONFIG_FILE)),
        };

        Self {
            bootstrap: RequestConfig {
                url: or_default(url, DEFAULT_BOOTSTRAP_URL),
                id,
                key,
                retries: or_default(retries, DEFAULT_RETRIES),
                retry_delay_secs: or_default(retry_delay_secs, DEFAULT_RETRY_DELAY_SECS),
                skip_tls,
                ca_file,
            },
            agent_config_file,
        }
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        String::from(default)
    } else {
        value
    }
}
