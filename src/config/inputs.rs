use crate::config::snippets;
use failure::{Fallible, ResultExt};
use std::path::{Path, PathBuf};

/// Directory holding snippets, relative to each base directory.
static SNIPPETS_DIR: &str = "agent-bootstrap/config.d";

/// Runtime configuration holding environmental inputs.
#[derive(Debug, Default, Serialize)]
pub(crate) struct ConfigInput {
    pub(crate) bootstrap: BootstrapInput,
    pub(crate) agent: AgentInput,
}

impl ConfigInput {
    /// Read config snippets and merge them into a single config.
    ///
    /// Base directories are scanned in order, so later ones take
    /// precedence. Snippets within a directory are read in lexical order.
    pub(crate) fn read_config(dirs: &[PathBuf]) -> Fallible<Self> {
        let mut snips = vec![];
        for dir in dirs {
            let path = dir.join(SNIPPETS_DIR);
            for fpath in snippet_files(&path)? {
                snips.push(read_snippet(&fpath)?);
            }
        }

        let cfg = Self::merge_snippets(snips);
        debug!(
            "configuration input:\n{}",
            toml::to_string_pretty(&cfg).context("failed to encode configuration input")?
        );

        Ok(cfg)
    }

    /// Merge multiple snippets into a single configuration.
    fn merge_snippets(snippets: Vec<snippets::ConfigSnippet>) -> Self {
        let mut bootstraps = vec![];
        let mut agents = vec![];

        for snip in snippets {
            if let Some(b) = snip.bootstrap {
                bootstraps.push(b);
            }
            if let Some(a) = snip.agent {
                agents.push(a);
            }
        }

        Self {
            bootstrap: BootstrapInput::from_snippets(bootstraps),
            agent: AgentInput::from_snippets(agents),
        }
    }
}

/// List `*.toml` files in `dir`, sorted by name.
fn snippet_files(dir: &Path) -> Fallible<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => {
            trace!("skipping missing config directory {:?}", dir);
            return Ok(vec![]);
        }
        Err(e) => bail!("failed to read directory '{}': {}", dir.display(), e),
    };

    let mut files = vec![];
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_snippet(path: &Path) -> Fallible<snippets::ConfigSnippet> {
    trace!("reading config snippet from {:?}", path);
    let content = std::fs::read(path).context(format!("failed to read file '{}'", path.display()))?;
    let snippet = toml::from_slice(&content)
        .context(format!("failed to parse TOML in '{}'", path.display()))?;
    Ok(snippet)
}

#[derive(Clone, Debug, Default, Serialize)]
pub(crate) struct BootstrapInput {
    pub(crate) url: String,
    pub(crate) id: String,
    #[serde(skip_serializing)]
    pub(crate) key: String,
    pub(crate) retries: String,
    pub(crate) retry_delay_seconds: String,
    pub(crate) skip_tls: bool,
    pub(crate) ca_file: String,
}

impl BootstrapInput {
    fn from_snippets(snippets: Vec<snippets::BootstrapSnippet>) -> Self {
        let mut cfg = Self::default();

        for snip in snippets {
            if let Some(u) = snip.url {
                cfg.url = u;
            }
            if let Some(i) = snip.id {
                cfg.id = i;
            }
            if let Some(k) = snip.key {
                cfg.key = k;
            }
            if let Some(r) = snip.retries {
                cfg.retries = r;
            }
            if let Some(d) = snip.retry_delay_seconds {
                cfg.retry_delay_seconds = d;
            }
            if let Some(s) = snip.skip_tls {
                cfg.skip_tls = s;
            }
            if let Some(c) = snip.ca_file {
                cfg.ca_file = c;
            }
        }

        cfg
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub(crate) struct AgentInput {
    pub(crate) config_file: String,
}

impl AgentInput {
    fn from_snippets(snippets: Vec<snippets::AgentSnippet>) -> Self {
        let mut cfg = Self::default();

        for snip in snippets {
            if let Some(f) = snip.config_file {
                cfg.config_file = f;
            }
        }

        cfg
    }
}
