use std::path::PathBuf;
use std::time::Instant;

use clap::Args;

use crate::cli::{load_config, OutputFormat};
use crate::polish::{PolishConfig, PolishOutcome, Polisher};
use crate::schedule::PhaseReport;
use crate::testing::{SyntheticAccelerator, SyntheticEngine, SyntheticWorkload};

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of accelerator devices
    #[arg(short, long, default_value = "1")]
    pub devices: usize,

    /// Path to a JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of accelerator batches (overrides the config)
    #[arg(short, long)]
    pub batches: Option<usize>,

    /// Number of host threads (overrides the config)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Number of targets to generate
    #[arg(long, default_value = "10")]
    pub targets: usize,

    /// Length of each generated target
    #[arg(long, default_value = "10000")]
    pub target_length: u32,

    /// Window length (overrides the config)
    #[arg(long)]
    pub window_length: Option<u32>,

    /// Mean number of sequences per window
    #[arg(long, default_value = "12")]
    pub mean_depth: u32,

    /// Deepest window a consensus batch accepts (overrides the config)
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Random seed for the workload
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Leave targets with no polished window out of the output
    #[arg(long)]
    pub drop_unpolished: bool,
}

impl SimulateArgs {
    fn apply(&self, config: &mut PolishConfig) {
        if let Some(batches) = self.batches {
            config.accelerator_batches = batches;
        }
        if let Some(threads) = self.threads {
            config.num_threads = threads;
        }
        if let Some(window_length) = self.window_length {
            config.window_length = window_length;
        }
        if let Some(max_depth) = self.max_depth {
            config.window_batch.max_depth_per_window = max_depth;
        }
        if self.drop_unpolished {
            config.drop_unpolished_sequences = true;
        }
    }
}

/// Execute simulate subcommand
///
/// # Errors
///
/// Returns an error if the config is invalid or either scheduling phase fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SimulateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let workload = SyntheticWorkload::generate(
        args.targets,
        args.target_length,
        config.window_length,
        args.mean_depth,
        args.seed,
    );
    if verbose {
        eprintln!(
            "Generated {} targets, {} windows, {} overlaps",
            workload.targets.len(),
            workload.windows.len(),
            workload.overlaps.len()
        );
    }

    let polisher = Polisher::new(config, SyntheticAccelerator::new(args.devices), |_| {
        SyntheticEngine::default()
    })?;

    let start = Instant::now();
    let mut overlaps = workload.overlaps;
    let overlap_report = polisher.align_overlaps(&mut overlaps)?;
    let outcome = polisher.polish(workload.windows, &workload.targets)?;
    let elapsed = start.elapsed();

    if verbose {
        eprintln!("Simulation finished in {:.3}s", elapsed.as_secs_f64());
    }

    match format {
        OutputFormat::Text => print_text_result(&overlap_report, &outcome),
        OutputFormat::Json => print_json_result(&overlap_report, &outcome)?,
        OutputFormat::Tsv => print_tsv_result(&outcome),
    }

    Ok(())
}

fn print_report(label: &str, report: &PhaseReport) {
    println!("\n{label}:");
    println!("  Total:             {}", report.total);
    println!("  Accelerated:       {}", report.accelerated);
    println!("  Host succeeded:    {}", report.fallback_succeeded);
    println!("  Host failed:       {}", report.fallback_failed);
    if report.unattempted > 0 {
        println!("  Unattempted:       {}", report.unattempted);
    }
}

fn print_text_result(overlaps: &PhaseReport, outcome: &PolishOutcome) {
    println!("Simulation Result");
    println!("{}", "=".repeat(60));

    print_report("Overlap alignment", overlaps);
    print_report("Window consensus", &outcome.report);

    println!("\nPolished sequences: {}", outcome.sequences.len());
    for sequence in &outcome.sequences {
        println!(
            "  {} ({} bp, {:.1}% polished)",
            sequence.name,
            sequence.len(),
            sequence.polished_ratio * 100.0
        );
    }
}

fn print_json_result(overlaps: &PhaseReport, outcome: &PolishOutcome) -> anyhow::Result<()> {
    let sequences: Vec<serde_json::Value> = outcome
        .sequences
        .iter()
        .map(|s| {
            serde_json::json!({
                "name": s.name,
                "length": s.len(),
                "coverage": s.coverage,
                "polished_ratio": s.polished_ratio,
            })
        })
        .collect();

    let output = serde_json::json!({
        "overlaps": overlaps,
        "windows": outcome.report,
        "sequences": sequences,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_result(outcome: &PolishOutcome) {
    println!("name\tlength\tcoverage\tpolished_ratio");
    for sequence in &outcome.sequences {
        println!(
            "{}\t{}\t{}\t{:.6}",
            sequence.name,
            sequence.len(),
            sequence.coverage,
            sequence.polished_ratio
        );
    }
}
