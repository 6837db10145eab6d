//! Command-line settlement runs over consignment CSV exports.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{profile, run};

/// IOSS/OSS VAT and duty settlement for returned consignments
#[derive(Parser)]
#[command(name = "dutyrefund")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the settlement pipeline on a consignment CSV
    Run(run::RunArgs),

    /// Show or create client profiles
    Profile(profile::ProfileArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => run::run(args),
        Commands::Profile(args) => profile::run(args),
    }
}
