//! Export service configuration.
//!
//! Decoded from the `content.export` section of a bootstrap payload.
//! This crate only seeds the file; its semantics belong to the export
//! service.

/// Default location of the export configuration file.
pub(crate) static DEFAULT_EXPORT_CONFIG_FILE: &str = "/configs/export/config.toml";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct ExportConfig {
    /// Target file for this configuration.
    pub(crate) file: String,
    pub(crate) exp: ExportServer,
    pub(crate) mqtt: ExportMqtt,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) routes: Vec<Route>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct ExportServer {
    pub(crate) log_level: String,
    pub(crate) nats: String,
    pub(crate) port: String,
    pub(crate) cache_url: String,
    pub(crate) cache_pass: String,
    pub(crate) cache_db: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct ExportMqtt {
    pub(crate) host: String,
    pub(crate) channel: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) mtls: bool,
    pub(crate) skip_tls_ver: bool,
    pub(crate) retain: bool,
    pub(crate) qos: u8,
    pub(crate) ca_path: String,
    pub(crate) cert_path: String,
    pub(crate) priv_key_path: String,
}

/// A single NATS to MQTT forwarding route.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct Route {
    pub(crate) mqtt_topic: String,
    pub(crate) nats_topic: String,
    pub(crate) subtopic: String,
    #[serde(rename = "type")]
    pub(crate) kind: String,
    pub(crate) workers: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_routes_after_tables() {
        let mut cfg = ExportConfig::default();
        cfg.file = "/tmp/export.toml".to_string();
        cfg.routes.push(Route {
            mqtt_topic: "channels/1/messages".to_string(),
            nats_topic: "export".to_string(),
            subtopic: String::new(),
            kind: "plain".to_string(),
            workers: 10,
        });

        let out = toml::to_string(&cfg).unwrap();
        assert!(out.starts_with("file = \"/tmp/export.toml\""));
        assert!(out.contains("[[routes]]"));
        assert!(out.contains("type = \"plain\""));

        let decoded: ExportConfig = toml::from_str(&out).unwrap();
        assert_eq!(decoded.routes.len(), 1);
        assert_eq!(decoded.routes[0].workers, 10);
    }
}
