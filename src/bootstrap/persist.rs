//! Persistence of translated configurations.

use crate::agent::AgentConfig;
use crate::export::{ExportConfig, DEFAULT_EXPORT_CONFIG_FILE};
use failure::{Fallible, ResultExt};
use std::io::Write;
use std::path::Path;

/// Write agent configuration to its destination file, replacing any
/// previous content.
pub(crate) fn save_agent_config(cfg: &AgentConfig) -> Fallible<()> {
    let content = toml::to_string(cfg).context("failed to encode agent config")?;
    write_atomic(&cfg.file, content.as_bytes())
        .context(format!("failed to save agent config '{}'", cfg.file.display()))?;
    info!("agent config saved to '{}'", cfg.file.display());
    Ok(())
}

/// Seed export configuration, unless a local one already exists.
///
/// An existing file always wins. Failures are only logged.
pub(crate) fn seed_export_config(mut cfg: ExportConfig) {
    if cfg.file.is_empty() {
        cfg.file = DEFAULT_EXPORT_CONFIG_FILE.to_string();
    }

    let path = Path::new(&cfg.file);
    if path.exists() {
        info!("export config file '{}' exists", cfg.file);
        return;
    }

    info!("saving export config file '{}'", cfg.file);
    if let Err(e) = save_export_config(&cfg) {
        warn!("failed to save export config file: {}", e);
    }
}

fn save_export_config(cfg: &ExportConfig) -> Fallible<()> {
    let content = toml::to_string(cfg).context("failed to encode export config")?;
    write_atomic(Path::new(&cfg.file), content.as_bytes())
        .context(format!("failed to write '{}'", cfg.file))?;
    Ok(())
}

/// Write `contents` to `path` through a temporary file and a rename.
fn write_atomic(path: &Path, contents: &[u8]) -> Fallible<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
