use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

use crate::catalog::{Brew, Catalog};
use crate::config::{self, Config};
use crate::engine::{Migrator, Options};
use crate::order;
use crate::prompt::Terminal;
use crate::resolve::Resolver;
use crate::scan;
use crate::system::MacSystem;

#[derive(Parser, Debug)]
#[command(name = "cask-migrate", version, about = "Replace manually installed apps in /Applications with their Homebrew cask equivalents.")]
pub struct Cli {
    /// Show what would happen without quitting, removing or installing anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Choose the processing order interactively before starting
    #[arg(long, default_value_t = false)]
    order: bool,
    /// Show cask description, homepage and version before each prompt
    #[arg(long, default_value_t = false)]
    verbose: bool,
    /// Config file (default: $XDG_CONFIG_HOME/cask-migrate/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log level
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
}

pub fn run() -> Result<()> {
    let cli = parse_args();
    init_logger(cli.log_level);

    let cfg_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&cfg_path)?;
    let quit_grace = cfg.quit_grace()?;
    let brew = locate_brew(&cfg)?;
    if !cfg.applications_dir.is_dir() {
        return Err(anyhow!("applications directory {} does not exist", cfg.applications_dir.display()));
    }
    log::debug!("using brew at {}", brew.display());

    let catalog = Brew::new(brew);
    let system = MacSystem;
    let mut prompt = Terminal;

    println!("Scanning {}...", cfg.applications_dir.display());
    let found = scan::scan(&cfg.applications_dir, &system).context("scanning applications")?;
    let installed = catalog.installed().unwrap_or_else(|e| {
        log::warn!("could not list installed casks ({e}); nothing will be pre-filtered");
        HashSet::new()
    });
    let resolver = Resolver::new(&catalog);
    let candidates = scan::filter_managed(found, &installed, &cfg.ignore, |name| resolver.resolve(name));
    if candidates.is_empty() {
        println!("Every app is already managed by Homebrew. Nothing to do.");
        return Ok(());
    }
    println!("Found {} app(s) not managed by Homebrew.", candidates.len());

    let candidates = if cli.order { order::prompt_order(candidates, &mut prompt) } else { candidates };
    if cli.dry_run {
        println!("--dry-run: nothing will be quit, removed or installed.");
    }

    let opts = Options { dry_run: cli.dry_run, verbose: cli.verbose, quit_grace };
    let report = Migrator::new(&catalog, &system, &mut prompt, opts).run(&candidates);
    println!();
    print!("{report}");
    Ok(())
}

/// Help and version exit 0; every other usage error exits 1.
fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    }
}

fn locate_brew(cfg: &Config) -> Result<PathBuf> {
    if let Some(path) = &cfg.brew {
        if path.is_file() { return Ok(path.clone()); }
        return Err(anyhow!("configured brew {} does not exist", path.display()));
    }
    which::which("brew").map_err(|_| anyhow!("'brew' not found on PATH; install Homebrew from https://brew.sh first"))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel { Trace, Debug, Info, Warn, Error }

fn init_logger(level: Option<LogLevel>) {
    let filter = match level.unwrap_or(LogLevel::Info) {
        LogLevel::Trace => log::LevelFilter::Trace,
        LogLevel::Debug => log::LevelFilter::Debug,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Warn => log::LevelFilter::Warn,
        LogLevel::Error => log::LevelFilter::Error,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(filter);
    let _ = builder.try_init();
}
