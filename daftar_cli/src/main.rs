mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "daftar")]
#[command(about = "Maintain a named-person registry and merge bulk imports into it")]
struct Cli {
    /// Output format: table, json, or csv
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty registry from a profile's field layout
    Init(commands::init::InitArgs),
    /// List stored records
    Records(commands::records::RecordsArgs),
    /// Compute an import plan without writing anything
    Analyze(commands::analyze::AnalyzeArgs),
    /// Analyze an import batch, confirm, and commit it
    Import(commands::import::ImportArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("daftar=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_flag(&cli.output);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args)?,
        Commands::Records(args) => commands::records::run(args, &format)?,
        Commands::Analyze(args) => commands::analyze::run(args, &format)?,
        Commands::Import(args) => commands::import::run(args, &format)?,
    }

    Ok(())
}
