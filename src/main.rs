mod app;
mod config;
mod input;
mod logging;
mod matcher;
mod model;
mod region;
mod source;
mod surface;
mod tty;
mod view;

use std::env;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use matcher::MatchAlgorithm;
use source::SourceOptions;
use surface::TerminalSurface;
use tty::TtyRedirect;

#[derive(Debug, Parser)]
#[command(
    name = "fuzzyselect",
    version,
    about = "Pick one line from a list with an interactive fuzzy filter"
)]
struct Cli {
    /// Candidates. Read from stdin as well when it is piped; the current directory is walked when both are empty
    values: Vec<String>,

    /// Override config path. If omitted, fuzzyselect checks ./fuzzyselect.toml, ./.fuzzyselect.toml, and then ~/.config/fuzzyselect/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep regular files only, walking directory arguments
    #[arg(long, overrides_with = "no_files")]
    files: bool,

    /// Treat candidates as plain strings
    #[arg(long, overrides_with = "files")]
    no_files: bool,

    /// Print absolute paths
    #[arg(long)]
    absolute: bool,

    /// Maximum number of candidates to collect
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Ranking algorithm
    #[arg(long, value_enum)]
    algorithm: Option<MatchAlgorithm>,

    /// Append debug logs to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Write an example config to the --config path (or the global path) and exit
    #[arg(long)]
    init_config: bool,

    /// Overwrite an existing file with --init-config
    #[arg(long, requires = "init_config")]
    force: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        let path = match cli.config {
            Some(path) => path,
            None => config::global_config_path()?,
        };
        config::write_example_config(&path, cli.force)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let cwd = env::current_dir()?;
    let loaded = config::load(&cwd, cli.config.as_deref())?;
    let settings = loaded.config;
    logging::init(&settings.log, cli.log.as_deref())?;
    info!(config = ?loaded.path, "configuration loaded");

    let files_only = if cli.files {
        true
    } else if cli.no_files {
        false
    } else {
        settings.candidates.files_only
    };
    let limit = cli.limit.unwrap_or(settings.candidates.limit);
    if limit == 0 {
        bail!("--limit must be greater than zero");
    }
    let options = SourceOptions {
        files_only,
        absolute: cli.absolute || settings.candidates.absolute,
        limit,
        prune: settings.candidates.prune_set()?,
    };

    let stdin = io::stdin();
    let piped = (!stdin.is_terminal()).then(|| stdin.lock());
    let candidates = source::collect(cli.values, piped, Path::new("."), &options)?;
    if candidates.is_empty() {
        info!("no candidates, nothing to pick");
        return Ok(());
    }

    let picker_settings = app::PickerSettings {
        algorithm: cli.algorithm.unwrap_or(settings.ranking.algorithm),
    };
    let selection = {
        let _redirect = TtyRedirect::acquire()?;
        let surface = TerminalSurface::open()?;
        app::run_picker(surface, candidates, picker_settings).context("picker failed")?
    };

    match selection {
        Some(line) => {
            info!(%line, "selected");
            println!("{line}");
        }
        None => info!("nothing selected"),
    }
    Ok(())
}
