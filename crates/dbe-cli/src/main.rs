// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE CLI
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! DBE controller CLI.
//!
//! Commands:
//! - event: run a short discharge and print each outcome as JSON
//! - batch: run independent seeded discharges and write one CSV row each

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dbe_control::batch::run_batch;
use dbe_control::{EventRequest, SimulationRun};
use dbe_types::config::DbeConfig;

#[derive(Parser)]
#[command(name = "dbe-cli")]
#[command(version)]
#[command(about = "DBE fusion stability controller simulations")]
struct Cli {
    /// JSON configuration file; defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured RNG seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Per-event operator inputs.
#[derive(Args, Clone)]
struct RequestArgs {
    /// Detection qubits requested
    #[arg(long, default_value = "60")]
    qubits: usize,

    /// Simulation (memory) qubits requested
    #[arg(long, default_value = "40")]
    memory: usize,

    /// Confinement coupling of the stability score
    #[arg(long, default_value = "0.3")]
    alpha: f64,

    /// Response-time coupling of the growth rate
    #[arg(long, default_value = "0.2")]
    beta: f64,

    /// Engage the time-crystal synchronisation bonus
    #[arg(long)]
    time_crystal: bool,

    /// Engage holographic compression
    #[arg(long)]
    compression: bool,

    /// Skip the acting phase
    #[arg(long)]
    no_mitigation: bool,
}

impl RequestArgs {
    fn to_request(&self, gamma_physical: f64) -> EventRequest {
        EventRequest {
            gamma_physical,
            alpha: self.alpha,
            beta: self.beta,
            qubits_alloc: self.qubits,
            memory_alloc: self.memory,
            engage_time_crystal: self.time_crystal,
            engage_compression: self.compression,
            execute_mitigation: !self.no_mitigation,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run events on one discharge and print outcomes as JSON lines
    Event {
        /// Physical instability growth rate
        #[arg(long, default_value = "1.0")]
        gamma: f64,

        /// Number of events
        #[arg(long, default_value = "1")]
        events: usize,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Run independent seeded discharges and write a CSV summary
    Batch {
        /// Number of runs
        #[arg(long, default_value = "100")]
        runs: usize,

        /// Events per run
        #[arg(long, default_value = "10")]
        events: usize,

        /// Output CSV file
        #[arg(long, default_value = "outputs/batch_runs.csv")]
        out: PathBuf,

        #[command(flatten)]
        request: RequestArgs,
    },
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<DbeConfig> {
    let mut config = match path {
        Some(p) => {
            let p_str = p.to_str().context("config path is not valid UTF-8")?;
            DbeConfig::from_file(p_str)
                .with_context(|| format!("failed to load config {}", p.display()))?
        }
        None => DbeConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn run_events(config: &DbeConfig, gamma: f64, events: usize, args: &RequestArgs) -> Result<()> {
    let mut run = SimulationRun::new(config)?;
    let request = args.to_request(gamma);
    for _ in 0..events {
        let outcome = run.simulate_event(&request)?;
        println!("{}", serde_json::to_string(&outcome)?);
    }
    let ledger = run.controller().ledger();
    info!(
        cumulative_q = ledger.cumulative_q,
        baseline_q = ledger.cumulative_q_baseline,
        improvement_pct = ledger.relative_improvement_pct(),
        "discharge complete"
    );
    Ok(())
}

fn write_batch(
    config: &DbeConfig,
    runs: usize,
    events: usize,
    out: &Path,
    args: &RequestArgs,
) -> Result<()> {
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let rows = run_batch(config, runs, events, &args.to_request(1.0))?;

    let file = File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(runs = rows.len(), path = %out.display(), "batch written");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(cli.config.as_deref(), cli.seed)?;

    match cli.command {
        Commands::Event {
            gamma,
            events,
            request,
        } => run_events(&config, gamma, events, &request),
        Commands::Batch {
            runs,
            events,
            out,
            request,
        } => write_batch(&config, runs, events, &out, &request),
    }
}
