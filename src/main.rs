use clap::Parser;
use tracing_subscriber::EnvFilter;

use polish_sched::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("polish_sched=debug,info")
    } else {
        EnvFilter::new("polish_sched=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Plan(args) => {
            cli::plan::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Simulate(args) => {
            cli::simulate::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
