//! Bootstrap service client.

use super::device::DeviceConfig;
use super::{BootstrapError, RequestConfig};
use failure::{Fallible, ResultExt};
use reqwest::header::AUTHORIZATION;
use std::path::{Path, PathBuf};

/// Source of remote device configuration.
pub(crate) trait FetchConfig {
    fn fetch_config(&self, req: &RequestConfig) -> Fallible<DeviceConfig>;
}

impl<T: FetchConfig + ?Sized> FetchConfig for &T {
    fn fetch_config(&self, req: &RequestConfig) -> Fallible<DeviceConfig> {
        (**self).fetch_config(req)
    }
}

/// HTTPS client for the bootstrap service.
#[derive(Clone, Debug, Default)]
pub(crate) struct HttpFetcher {}

impl FetchConfig for HttpFetcher {
    fn fetch_config(&self, req: &RequestConfig) -> Fallible<DeviceConfig> {
        let tls = TlsOptions {
            skip_verify: req.skip_tls,
            ca_file: req.ca_file.clone(),
        };
        fetch_device_config(&req.id, &req.key, &req.url, &tls)
    }
}

/// TLS trust settings.
#[derive(Clone, Debug, Default)]
pub(crate) struct TlsOptions {
    /// Disable certificate verification entirely.
    pub(crate) skip_verify: bool,
    /// Additional PEM certificate to trust, on top of system roots.
    pub(crate) ca_file: Option<PathBuf>,
}

/// Fetch device configuration from the bootstrap service.
///
/// This issues `GET <base_url>/<device_id>`, authenticated with the
/// device key, and decodes the (normalized) JSON response.
pub(crate) fn fetch_device_config(
    device_id: &str,
    device_key: &str,
    base_url: &str,
    tls: &TlsOptions,
) -> Fallible<DeviceConfig> {
    let client = build_client(tls)?;
    let endpoint = format!("{}/{}", base_url, device_id);
    trace!("GET to bootstrap endpoint: {}", endpoint);

    let mut resp = client
        .get(endpoint.as_str())
        .header(AUTHORIZATION, device_key)
        .send()?;

    let status = resp.status();
    if status.as_u16() >= 400 {
        let reason = status.canonical_reason().unwrap_or("unknown status");
        return Err(BootstrapError::Status(reason.to_string()).into());
    }

    let body = resp.text()?;
    let normalized = normalize_content(&body);
    trace!("bootstrap response:\n{}", normalized);

    let device = serde_json::from_str(&normalized)?;
    Ok(device)
}

/// Undo string-encoding of nested objects in a bootstrap response.
///
/// The bootstrap server serializes the nested `content` object as an
/// escaped JSON string. This is a textual workaround for that server
/// quirk and not a general unescaping routine: it drops every backslash,
/// then unquotes `"{` and `}"`, in that order.
pub(crate) fn normalize_content(body: &str) -> String {
    body.replace('\\', "")
        .replace("\"{", "{")
        .replace("}\"", "}")
}

fn build_client(tls: &TlsOptions) -> Fallible<reqwest::Client> {
    let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(tls.skip_verify);
    if tls.skip_verify {
        warn!("TLS certificate verification disabled for bootstrap");
    }

    // Extra trust anchors are best-effort, system roots stay in place.
    if let Some(path) = &tls.ca_file {
        match read_certificate(path) {
            Ok(cert) => builder = builder.add_root_certificate(cert),
            Err(e) => error!("{}, continuing with system roots only", e),
        }
    }

    let client = builder.build()?;
    Ok(client)
}

fn read_certificate(path: &Path) -> Fallible<reqwest::Certificate> {
    let pem = std::fs::read(path)
        .context(format!("failed to read CA file '{}'", path.display()))?;
    let cert = reqwest::Certificate::from_pem(&pem)
        .context(format!("failed to parse CA file '{}'", path.display()))?;
    Ok(cert)
}
