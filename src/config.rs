use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;

use crate::matcher::MatchAlgorithm;

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub candidates: CandidatesConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_true() -> bool {
    true
}

fn default_limit() -> usize {
    500
}

fn default_prune() -> Vec<String> {
    vec![".*".to_string(), "__*".to_string()]
}

fn default_log_filter() -> String {
    "fuzzyselect=debug".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatesConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_true")]
    pub files_only: bool,
    #[serde(default)]
    pub absolute: bool,
    #[serde(default = "default_prune")]
    pub prune: Vec<String>,
}

impl Default for CandidatesConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            files_only: true,
            absolute: false,
            prune: default_prune(),
        }
    }
}

impl CandidatesConfig {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            bail!("candidates.limit must be greater than zero");
        }
        self.prune_set().map(|_| ())
    }

    /// Compiles the prune patterns; entry names matching any of them are
    /// skipped by the directory walk.
    pub fn prune_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.prune {
            let glob =
                Glob::new(pattern).with_context(|| format!("invalid prune pattern: {pattern}"))?;
            builder.add(glob);
        }
        builder.build().context("failed to compile prune patterns")
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RankingConfig {
    #[serde(default)]
    pub algorithm: MatchAlgorithm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: None,
            filter: default_log_filter(),
        }
    }
}

pub fn load(cwd: &Path, explicit_path: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit_path {
        return Ok(LoadedConfig {
            config: load_from_path(path)?,
            path: Some(path.to_path_buf()),
        });
    }

    let local_candidates = [cwd.join("fuzzyselect.toml"), cwd.join(".fuzzyselect.toml")];
    for path in &local_candidates {
        if path.exists() {
            return Ok(LoadedConfig {
                config: load_from_path(path)?,
                path: Some(path.to_path_buf()),
            });
        }
    }

    if let Ok(global_path) = global_config_path() {
        if global_path.exists() {
            return Ok(LoadedConfig {
                config: load_from_path(&global_path)?,
                path: Some(global_path),
            });
        }
    }

    Ok(LoadedConfig {
        config: Config::default(),
        path: None,
    })
}

pub fn global_config_path() -> Result<PathBuf> {
    let config_root = dirs::config_dir().context("unable to resolve OS config directory")?;
    Ok(config_root.join("fuzzyselect").join("config.toml"))
}

pub fn default_log_path() -> Option<PathBuf> {
    let cache_root = dirs::cache_dir()?;
    Some(cache_root.join("fuzzyselect").join("fuzzyselect.log"))
}

pub fn write_example_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn load_from_path(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))?;
    config
        .candidates
        .validate()
        .with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(config)
}

const EXAMPLE_CONFIG: &str = r#"# fuzzyselect config
#
# Command-line flags override everything in this file.

[candidates]
# Stop collecting after this many candidates.
limit = 500
# Keep regular files only; directory arguments are walked.
files_only = true
# Print absolute paths.
absolute = false
# Entry names skipped while walking directories.
prune = [".*", "__*"]

[ranking]
# "gap" rewards tightly clustered matches, "skim" uses skim's scorer.
algorithm = "gap"

[log]
enabled = false
# file = "/tmp/fuzzyselect.log"
filter = "fuzzyselect=debug"
"#;
