use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::{self, LogConfig};

/// Installs a file-backed subscriber when logging is requested. The terminal is
/// owned by the picker, so nothing is ever written to stderr.
///
/// Returns the log path in use, if any.
pub fn init(settings: &LogConfig, override_path: Option<&Path>) -> Result<Option<PathBuf>> {
    let path = match (override_path, &settings.file) {
        (Some(path), _) => path.to_path_buf(),
        (None, _) if !settings.enabled => return Ok(None),
        (None, Some(path)) => path.clone(),
        (None, None) => {
            config::default_log_path().context("unable to resolve OS cache directory")?
        }
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_new(&settings.filter)
        .with_context(|| format!("invalid log filter: {}", settings.filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(Some(path))
}
