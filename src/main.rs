//! ccore-probe
//!
//! Loads the engine library the same way the bindings do and reports which
//! entry points it exports.

use anyhow::{Context, Result};
use ccore_bridge::{BridgeConfig, Engine};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ccore-probe")]
#[command(version)]
#[command(about = "Check that the ccore engine library loads and exports its entry points", long_about = None)]
struct Cli {
    /// Config file (default: nearest ccore.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Library name or path, overrides the config
    #[arg(short, long)]
    library: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ccore_bridge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BridgeConfig::load_from_cwd().context("Failed to load ccore.toml")?,
    };
    let mut config = config.with_env_overrides();
    if let Some(library) = cli.library {
        config.engine.library = library;
    }

    let engine = Engine::open(&config.engine)
        .with_context(|| format!("Cannot open engine '{}'", config.engine.library))?;
    let probe = engine.probe();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&probe)?);
        return Ok(());
    }

    println!("Engine: {}", probe.path.display());
    println!(
        "Entry points: {}/{} present",
        probe.present.len(),
        probe.present.len() + probe.missing.len()
    );
    for name in &probe.missing {
        println!("  missing: {}", name);
    }
    if cli.verbose {
        for name in &probe.present {
            println!("  present: {}", name);
        }
    }

    Ok(())
}
