//! Translation from device configuration to agent configuration.

use super::device::{Channel, DeviceConfig};
use crate::agent::{AgentConfig, ChanConfig, MqttConfig};
use std::path::Path;

/// Pick control and data channels.
///
/// Only the first two channels are considered. When the first one is
/// marked with `type = "data"` it becomes the data channel and the
/// second one the control channel. Otherwise the first channel is the
/// control channel and the second one the data channel.
///
/// Returns `None` if fewer than two channels are available.
pub(crate) fn select_channels(channels: &[Channel]) -> Option<ChanConfig> {
    match channels {
        [first, second, ..] if first.is_data() => Some(ChanConfig {
            control: second.id.clone(),
            data: first.id.clone(),
        }),
        [first, second, ..] => Some(ChanConfig {
            control: first.id.clone(),
            data: second.id.clone(),
        }),
        _ => None,
    }
}

/// Build the agent configuration for `file` out of a device configuration.
///
/// Service sections are copied as-is. MQTT credentials and certificates
/// always come from the device configuration itself.
pub(crate) fn translate(device: DeviceConfig, channels: ChanConfig, file: &Path) -> AgentConfig {
    let agent = device.content.agent;
    let mqtt = MqttConfig {
        username: device.id,
        password: device.key,
        client_cert: device.client_cert,
        client_key: device.client_key,
        ca_cert: device.ca_cert,
        ..agent.mqtt
    };

    AgentConfig {
        server: agent.server,
        channels,
        edgex: agent.edgex,
        log: agent.log,
        mqtt,
        heartbeat: agent.heartbeat,
        terminal: agent.terminal,
        file: file.to_path_buf(),
    }
}
