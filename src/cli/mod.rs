//! Command-line interface for polish-sched.
//!
//! Available commands:
//!
//! - **plan**: Show how accelerator batches are laid out over devices
//! - **simulate**: Run both scheduling phases over a synthetic workload
//!
//! ## Usage
//!
//! ```text
//! # Batch layout for 6 batches on 4 devices
//! polish-sched plan --devices 4 --batches 6
//!
//! # Layout from a config file, as JSON
//! polish-sched plan --config run.json --format json
//!
//! # Simulate a run with a shallow accelerator depth limit to force host fallback
//! polish-sched simulate --targets 20 --max-depth 15 --threads 4 -v
//! ```

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::polish::PolishConfig;

pub mod plan;
pub mod simulate;

#[derive(Parser)]
#[command(name = "polish-sched")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Schedule sequence polishing work over accelerator batches and host threads")]
#[command(
    long_about = "polish-sched distributes overlap alignment and window consensus work over a fixed set of accelerator batch units.\n\nWork the accelerator could not complete is retried on a host thread pool, and per-window results are merged back in original order into one polished record per target."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the batch-to-device layout
    Plan(plan::PlanArgs),

    /// Run the scheduler over a synthetic workload
    Simulate(simulate::SimulateArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load the config file if one was given, otherwise start from defaults
fn load_config(path: Option<&Path>) -> anyhow::Result<PolishConfig> {
    match path {
        Some(path) => Ok(PolishConfig::load_from_file(path)?),
        None => Ok(PolishConfig::default()),
    }
}
