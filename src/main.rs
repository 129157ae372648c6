//! agent-bootstrap: device configuration bootstrapper.
//!
//! This binary retrieves a device's runtime configuration from a remote
//! bootstrap service and writes it out as local configuration files,
//! ahead of starting the long-running agent.
//!
//! It is made of a few sequential stages:
//!  * `config` - layered TOML snippets plus command-line overrides.
//!  * `bootstrap` - HTTPS fetch with bounded retries, translation and persistence.
//!  * `agent`/`export` - configuration formats of the downstream services.

extern crate env_logger;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate reqwest;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate structopt;
extern crate tempfile;
extern crate toml;

mod agent;
mod bootstrap;
mod cli;
mod config;
mod export;

use crate::bootstrap::Outcome;
use crate::cli::CliOptions;
use failure::Fallible;
use structopt::StructOpt;

fn main() -> Fallible<()> {
    let opts = CliOptions::from_args();

    let mut logger = env_logger::Builder::from_default_env();
    if let Some(level) = opts.log_level() {
        logger.filter(Some(module_path!()), level);
    }
    logger.try_init()?;
    info!("starting agent-bootstrap");

    let settings = config::Settings::assemble(&opts)?;
    match bootstrap::bootstrap(&settings.bootstrap, &settings.agent_config_file)? {
        Outcome::Skipped => info!("bootstrap disabled"),
        Outcome::FallbackToLocal => info!("keeping local agent configuration"),
        Outcome::Configured(cfg) => info!(
            "agent configured (control channel '{}', data channel '{}')",
            cfg.channels.control, cfg.channels.data
        ),
    }

    Ok(())
}
