// Eventflow CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: Engine state lives in a snapshot file so runs can be chained.

mod commands;
mod files;
mod output;

use clap::{Parser, Subcommand};
use eventflow_actions::{init_telemetry, TelemetryConfig};

#[derive(Parser)]
#[command(name = "eventflow")]
#[command(about = "Eventflow CLI - Run event actions against workflow state")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute an action for an event
    Run(commands::run::RunArgs),

    /// Show which task a reference resolves to
    Resolve(commands::resolve::ResolveArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(TelemetryConfig::from_env().with_stderr());
    let output_format = output::OutputFormat::from_str(&cli.output);

    match cli.command {
        Commands::Run(args) => commands::run::run(args, output_format, cli.quiet).await,
        Commands::Resolve(args) => commands::resolve::run(args, output_format).await,
    }
}
