//! Device bootstrapping.
//!
//! This module retrieves device configuration from a remote bootstrap
//! service, with bounded retries, and materializes it as local agent and
//! export configuration files.
//!
//! Failing to reach the bootstrap service is not fatal: once retries are
//! exhausted the device keeps running on its local configuration.

mod device;
mod fetch;
mod persist;
mod translate;

use device::DeviceConfig;
use fetch::{FetchConfig, HttpFetcher};

use crate::agent::AgentConfig;
use failure::{Fail, Fallible};
use std::path::{Path, PathBuf};
use std::{mem, thread, time};

/// Parameters for a bootstrap request.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct RequestConfig {
    /// Bootstrap service base URL.
    pub(crate) url: String,
    /// Device ID.
    pub(crate) id: String,
    /// Device key, used as authorization token.
    #[serde(skip_serializing)]
    pub(crate) key: String,
    /// Number of fetch attempts, as a base-10 integer.
    pub(crate) retries: String,
    /// Seconds to wait after each failed attempt, as a base-10 integer.
    pub(crate) retry_delay_secs: String,
    /// Disable TLS certificate verification.
    pub(crate) skip_tls: bool,
    /// Additional CA certificate to trust.
    pub(crate) ca_file: Option<PathBuf>,
}

/// Bootstrap errors which callers may need to tell apart.
#[derive(Clone, Debug, Fail, PartialEq)]
pub(crate) enum BootstrapError {
    #[fail(display = "invalid bootstrap retries value: {}", _0)]
    InvalidRetries(String),
    #[fail(display = "invalid bootstrap retry delay value: {}", _0)]
    InvalidRetryDelay(String),
    /// Bootstrap service replied with an error status.
    #[fail(display = "{}", _0)]
    Status(String),
    #[fail(display = "malformed entity specification")]
    MalformedEntity,
}

/// Result of a bootstrap run.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// Bootstrap disabled (zero retries).
    Skipped,
    /// Bootstrap service unreachable, local configuration is kept.
    FallbackToLocal,
    /// Agent configuration fetched and saved.
    Configured(AgentConfig),
}

/// Bootstrap this device, saving agent configuration to `destination`.
pub(crate) fn bootstrap(cfg: &RequestConfig, destination: &Path) -> Fallible<Outcome> {
    let mut driver = RetryDriver::new(HttpFetcher::default(), thread::sleep);
    driver.run(cfg, destination)
}

/// Retry loop around a configuration fetcher.
pub(crate) struct RetryDriver<F, S> {
    fetcher: F,
    sleep: S,
}

impl<F, S> RetryDriver<F, S>
where
    F: FetchConfig,
    S: FnMut(time::Duration),
{
    pub(crate) fn new(fetcher: F, sleep: S) -> Self {
        Self { fetcher, sleep }
    }

    /// Fetch, translate and persist device configuration.
    ///
    /// Every failed attempt is followed by a pause, the last one
    /// included. Invalid retry parameters, a device with fewer than two
    /// channels, and agent config write failures are errors; everything
    /// else degrades to `Outcome::FallbackToLocal`.
    pub(crate) fn run(&mut self, cfg: &RequestConfig, destination: &Path) -> Fallible<Outcome> {
        let retries: u64 = cfg
            .retries
            .parse()
            .map_err(|e| BootstrapError::InvalidRetries(format!("'{}': {}", cfg.retries, e)))?;
        let delay_secs: u64 = cfg.retry_delay_secs.parse().map_err(|e| {
            BootstrapError::InvalidRetryDelay(format!("'{}': {}", cfg.retry_delay_secs, e))
        })?;

        if retries == 0 {
            info!("no bootstrapping, local configuration will be used");
            return Ok(Outcome::Skipped);
        }

        info!("requesting config for {} from {}", cfg.id, cfg.url);
        let mut device = match self.fetch_with_retries(cfg, retries, delay_secs) {
            Some(dc) => dc,
            None => {
                warn!("bootstrap retries exhausted");
                info!("continuing with local config");
                return Ok(Outcome::FallbackToLocal);
            }
        };

        let export = mem::take(&mut device.content.export);
        persist::seed_export_config(export);

        let channels = match translate::select_channels(&device.channels) {
            Some(c) => c,
            None => {
                error!(
                    "expected at least 2 channels, bootstrap returned {}",
                    device.channels.len()
                );
                return Err(BootstrapError::MalformedEntity.into());
            }
        };
        debug!(
            "control channel '{}', data channel '{}'",
            channels.control, channels.data
        );

        let agent = translate::translate(device, channels, destination);
        persist::save_agent_config(&agent)?;
        Ok(Outcome::Configured(agent))
    }

    fn fetch_with_retries(
        &mut self,
        cfg: &RequestConfig,
        retries: u64,
        delay_secs: u64,
    ) -> Option<DeviceConfig> {
        for attempt in 1..=retries {
            match self.fetcher.fetch_config(cfg) {
                Ok(dc) => return Some(dc),
                Err(e) => {
                    error!("fetching bootstrap config failed: {}", e);
                    debug!(
                        "retries remaining: {}, retrying in {} seconds",
                        retries - attempt,
                        delay_secs
                    );
                    (self.sleep)(time::Duration::from_secs(delay_secs));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::device::Channel;
    use super::*;
    use failure::format_err;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::fs;
    use std::time::Duration;

    /// Replays scripted results, failing once the script runs out.
    #[derive(Default)]
    struct ScriptedFetcher {
        script: RefCell<VecDeque<Fallible<DeviceConfig>>>,
        calls: Cell<usize>,
    }

    impl ScriptedFetcher {
        fn new(script: Vec<Fallible<DeviceConfig>>) -> Self {
            Self {
                script: RefCell::new(script.into()),
                calls: Cell::new(0),
            }
        }
    }

    impl FetchConfig for ScriptedFetcher {
        fn fetch_config(&self, _req: &RequestConfig) -> Fallible<DeviceConfig> {
            self.calls.set(self.calls.get() + 1);
            self.script
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(format_err!("connection refused")))
        }
    }

    fn request(retries: &str, delay: &str) -> RequestConfig {
        RequestConfig {
            url: "https://bootstrap.invalid/things/bootstrap".to_string(),
            id: "dev-1".to_string(),
            key: "secret".to_string(),
            retries: retries.to_string(),
            retry_delay_secs: delay.to_string(),
            skip_tls: false,
            ca_file: None,
        }
    }

    fn device(channels: &[&str], export_file: &Path) -> DeviceConfig {
        let mut dc = DeviceConfig::default();
        dc.id = "dev-1".to_string();
        dc.key = "secret".to_string();
        dc.channels = channels
            .iter()
            .map(|id| Channel {
                id: id.to_string(),
                ..Channel::default()
            })
            .collect();
        dc.content.export.file = export_file.to_string_lossy().into_owned();
        dc
    }

    fn run(
        fetcher: &ScriptedFetcher,
        cfg: &RequestConfig,
        destination: &Path,
    ) -> (Fallible<Outcome>, Vec<Duration>) {
        let mut sleeps = vec![];
        let outcome = {
            let mut driver = RetryDriver::new(fetcher, |d| sleeps.push(d));
            driver.run(cfg, destination)
        };
        (outcome, sleeps)
    }

    #[test]
    fn zero_retries_skips_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("agent.toml");
        let fetcher = ScriptedFetcher::default();

        let (outcome, sleeps) = run(&fetcher, &request("0", "10"), &dest);

        assert!(matches!(outcome.unwrap(), Outcome::Skipped));
        assert_eq!(fetcher.calls.get(), 0);
        assert!(sleeps.is_empty());
        assert!(!dest.exists());
    }

    #[test]
    fn invalid_retry_parameters_are_fatal() {
        let dest = Path::new("/nonexistent/agent.toml");
        let cases = vec![
            ("five", "10", BootstrapError::InvalidRetries(String::new())),
            ("-1", "10", BootstrapError::InvalidRetries(String::new())),
            ("", "10", BootstrapError::InvalidRetries(String::new())),
            ("3", "1.5", BootstrapError::InvalidRetryDelay(String::new())),
            ("0", "soon", BootstrapError::InvalidRetryDelay(String::new())),
        ];

        for (retries, delay, expected) in cases {
            let fetcher = ScriptedFetcher::default();
            let (outcome, sleeps) = run(&fetcher, &request(retries, delay), dest);

            let err = outcome.unwrap_err();
            let kind = err.downcast_ref::<BootstrapError>().unwrap();
            assert_eq!(mem::discriminant(kind), mem::discriminant(&expected));
            assert_eq!(fetcher.calls.get(), 0);
            assert!(sleeps.is_empty());
        }
    }

    #[test]
    fn exhausted_retries_fall_back_to_local() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("agent.toml");
        let fetcher = ScriptedFetcher::default();

        let (outcome, sleeps) = run(&fetcher, &request("3", "7"), &dest);

        assert!(matches!(outcome.unwrap(), Outcome::FallbackToLocal));
        assert_eq!(fetcher.calls.get(), 3);
        assert_eq!(sleeps, vec![Duration::from_secs(7); 3]);
        assert!(!dest.exists());
    }

    #[test]
    fn success_stops_retrying() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("agent.toml");
        let export = dir.path().join("export.toml");
        let fetcher = ScriptedFetcher::new(vec![
            Err(format_err!("timeout")),
            Ok(device(&["ctl", "dat"], &export)),
        ]);

        let (outcome, sleeps) = run(&fetcher, &request("5", "2"), &dest);

        match outcome.unwrap() {
            Outcome::Configured(cfg) => {
                assert_eq!(cfg.channels.control, "ctl");
                assert_eq!(cfg.channels.data, "dat");
                assert_eq!(cfg.mqtt.username, "dev-1");
                assert_eq!(cfg.file, dest);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(fetcher.calls.get(), 2);
        assert_eq!(sleeps, vec![Duration::from_secs(2)]);

        let saved: AgentConfig = toml::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(saved.mqtt.password, "secret");
        assert!(export.exists());
    }

    #[test]
    fn too_few_channels_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("agent.toml");
        let export = dir.path().join("export.toml");
        let fetcher = ScriptedFetcher::new(vec![Ok(device(&["only"], &export))]);

        let (outcome, sleeps) = run(&fetcher, &request("3", "1"), &dest);

        let err = outcome.unwrap_err();
        assert_eq!(
            err.downcast_ref::<BootstrapError>(),
            Some(&BootstrapError::MalformedEntity)
        );
        assert_eq!(fetcher.calls.get(), 1);
        assert!(sleeps.is_empty());
        assert!(!dest.exists());
        // Export seeding happens before channel validation.
        assert!(export.exists());
    }

    #[test]
    fn persistence_failure_is_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let dest = blocker.join("agent.toml");
        let export = dir.path().join("export.toml");
        let fetcher = ScriptedFetcher::new(vec![Ok(device(&["ctl", "dat"], &export))]);

        let (outcome, _) = run(&fetcher, &request("1", "0"), &dest);

        let err = outcome.unwrap_err();
        assert!(err.downcast_ref::<BootstrapError>().is_none());
        assert_eq!(fetcher.calls.get(), 1);
    }
}
