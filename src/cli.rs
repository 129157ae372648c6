//! Command-line options.

use std::path::PathBuf;
use structopt::StructOpt;

/// Fetch device configuration from a bootstrap service.
#[derive(Debug, StructOpt)]
#[structopt(name = "agent-bootstrap")]
pub(crate) struct CliOptions {
    /// Verbosity level (repeat for more)
    #[structopt(short = "v", parse(from_occurrences))]
    pub(crate) verbosity: u8,

    /// Base directory for configuration snippets (repeatable)
    #[structopt(long = "config-dir", parse(from_os_str))]
    pub(crate) config_dirs: Vec<PathBuf>,

    /// Bootstrap service URL
    #[structopt(long = "url", env = "MF_AGENT_BOOTSTRAP_URL")]
    pub(crate) url: Option<String>,

    /// Device ID
    #[structopt(long = "id", env = "MF_AGENT_BOOTSTRAP_ID")]
    pub(crate) id: Option<String>,

    /// Device key
    #[structopt(long = "key", env = "MF_AGENT_BOOTSTRAP_KEY")]
    pub(crate) key: Option<String>,

    /// Number of fetch attempts, 0 disables bootstrap
    #[structopt(long = "retries", env = "MF_AGENT_BOOTSTRAP_RETRIES")]
    pub(crate) retries: Option<String>,

    /// Seconds to wait after a failed attempt
    #[structopt(long = "retry-delay", env = "MF_AGENT_BOOTSTRAP_RETRY_DELAY_SECONDS")]
    pub(crate) retry_delay: Option<String>,

    /// Skip TLS certificate verification (true/false)
    #[structopt(long = "skip-tls", env = "MF_AGENT_BOOTSTRAP_SKIP_TLS")]
    pub(crate) skip_tls: Option<bool>,

    /// Additional PEM CA certificate to trust
    #[structopt(long = "ca-file", env = "MF_AGENT_BOOTSTRAP_CA_FILE", parse(from_os_str))]
    pub(crate) ca_file: Option<PathBuf>,

    /// Destination of the agent configuration file
    #[structopt(long = "agent-config", env = "MF_AGENT_CONFIG_FILE", parse(from_os_str))]
    pub(crate) agent_config: Option<PathBuf>,
}

impl CliOptions {
    /// Log level filter selected by `-v` flags, if any.
    pub(crate) fn log_level(&self) -> Option<log::LevelFilter> {
        match self.verbosity {
            0 => None,
            1 => Some(log::LevelFilter::Info),
            2 => Some(log::LevelFilter::Debug),
            _ => Some(log::LevelFilter::Trace),
        }
    }
}
