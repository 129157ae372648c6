//! Device configuration, as served by the bootstrap service.

use crate::agent::AgentConfig;
use crate::export::ExportConfig;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// Remote configuration for this device.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DeviceConfig {
    #[serde(rename = "mainflux_id", deserialize_with = "null_as_default")]
    pub(crate) id: String,
    #[serde(rename = "mainflux_key", deserialize_with = "null_as_default")]
    pub(crate) key: String,
    #[serde(rename = "mainflux_channels", deserialize_with = "null_as_default")]
    pub(crate) channels: Vec<Channel>,
    #[serde(deserialize_with = "null_as_default")]
    pub(crate) client_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub(crate) client_cert: String,
    #[serde(deserialize_with = "null_as_default")]
    pub(crate) ca_cert: String,
    pub(crate) content: ServicesConfig,
}

/// Nested per-service configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ServicesConfig {
    pub(crate) agent: AgentConfig,
    pub(crate) export: ExportConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Channel {
    pub(crate) id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub(crate) metadata: HashMap<String, Value>,
}

impl Channel {
    /// Whether this channel is marked as carrying data traffic.
    pub(crate) fn is_data(&self) -> bool {
        self.metadata.get("type").and_then(Value::as_str) == Some("data")
    }
}

/// Decode a `null` value as the type default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
