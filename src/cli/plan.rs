use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_config, OutputFormat};
use crate::core::types::DeviceId;
use crate::schedule::DeviceLayout;

#[derive(Args)]
pub struct PlanArgs {
    /// Number of accelerator devices
    #[arg(short, long, default_value = "1")]
    pub devices: usize,

    /// Number of accelerator batches (overrides the config)
    #[arg(short, long)]
    pub batches: Option<usize>,

    /// Path to a JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Execute plan subcommand
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or there are no devices.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PlanArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(batches) = args.batches {
        config.accelerator_batches = batches;
    }
    config.validate()?;

    if verbose {
        eprintln!(
            "Laying out {} batches over {} device(s)",
            config.accelerator_batches, args.devices
        );
    }

    let layout = DeviceLayout::round_robin(config.accelerator_batches, args.devices)?;

    match format {
        OutputFormat::Text => print_text_plan(&layout),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&layout)?),
        OutputFormat::Tsv => print_tsv_plan(&layout),
    }

    Ok(())
}

fn print_text_plan(layout: &DeviceLayout) {
    println!("Batch Layout");
    println!("{}", "=".repeat(40));
    println!("Devices: {}", layout.devices);
    println!("Batches: {}", layout.len());

    for device in 0..layout.devices {
        #[allow(clippy::cast_possible_truncation)] // device count is small
        let device = DeviceId(device as u32);
        let ids: Vec<String> = layout
            .slots
            .iter()
            .filter(|slot| slot.device == device)
            .map(|slot| slot.id.to_string())
            .collect();
        println!(
            "\n  Device {device}: {} batch(es) [{}]",
            ids.len(),
            ids.join(", ")
        );
    }
}

fn print_tsv_plan(layout: &DeviceLayout) {
    println!("batch\tdevice");
    for slot in &layout.slots {
        println!("{}\t{}", slot.id, slot.device);
    }
}
