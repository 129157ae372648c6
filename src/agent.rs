//! Agent runtime configuration.
//!
//! These structures mirror the configuration file consumed by the
//! long-running agent. They are decoded from the `content.agent`
//! section of a bootstrap payload and persisted as TOML.

use std::path::PathBuf;

/// Configuration for the agent runtime.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct AgentConfig {
    pub(crate) server: ServerConfig,
    pub(crate) channels: ChanConfig,
    pub(crate) edgex: EdgexConfig,
    pub(crate) log: LogConfig,
    pub(crate) mqtt: MqttConfig,
    pub(crate) heartbeat: HeartbeatConfig,
    pub(crate) terminal: TerminalConfig,
    /// Destination file, not part of the serialized content.
    #[serde(skip)]
    pub(crate) file: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct ServerConfig {
    pub(crate) nats_url: String,
    pub(crate) port: String,
}

/// Control and data channel IDs.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub(crate) struct ChanConfig {
    pub(crate) control: String,
    pub(crate) data: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct EdgexConfig {
    pub(crate) url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct LogConfig {
    pub(crate) level: String,
}

/// MQTT client settings, including credentials.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct MqttConfig {
    pub(crate) url: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) mtls: bool,
    pub(crate) skip_tls_ver: bool,
    pub(crate) retain: bool,
    pub(crate) qos: u8,
    pub(crate) ca_path: String,
    pub(crate) cert_path: String,
    pub(crate) priv_key_path: String,
    /// PEM-encoded CA certificate.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) ca_cert: String,
    /// PEM-encoded client certificate.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) client_cert: String,
    /// PEM-encoded client private key.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) client_key: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct HeartbeatConfig {
    /// Heartbeat period, as a duration string (e.g. `10s`).
    pub(crate) interval: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct TerminalConfig {
    /// Idle timeout for remote terminal sessions (e.g. `60s`).
    pub(crate) session_timeout: String,
}
