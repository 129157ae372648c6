/// Top-level configuration stanza.
#[derive(Debug, Deserialize)]
pub(crate) struct ConfigSnippet {
    /// Bootstrap client configuration.
    pub(crate) bootstrap: Option<BootstrapSnippet>,
    /// Agent configuration target.
    pub(crate) agent: Option<AgentSnippet>,
}

/// Config snippet for bootstrap client.
#[derive(Debug, Deserialize)]
pub(crate) struct BootstrapSnippet {
    /// Base URL of the bootstrap service (default: local endpoint).
    pub(crate) url: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) key: Option<String>,
    /// Fetch attempts, `0` to disable bootstrap (default: 5)
    pub(crate) retries: Option<String>,
    /// Delay after each failed attempt, in seconds (default: 10)
    pub(crate) retry_delay_seconds: Option<String>,
    pub(crate) skip_tls: Option<bool>,
    /// PEM file with an additional CA certificate.
    pub(crate) ca_file: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AgentSnippet {
    /// Path of the agent configuration file to write.
    pub(crate) config_file: Option<String>,
}
