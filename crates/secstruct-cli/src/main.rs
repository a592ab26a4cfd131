//! secstruct CLI - segment SEC filings and extract structured JSON.

use clap::Parser;
use secstruct_cli::{commands, Cli, Command};
use tracing_subscriber::EnvFilter;

fn main() {
    // Log to stderr so stdout stays clean for JSON output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Process(args) => commands::execute_process(args),
        Command::Detect(args) => commands::execute_detect(args),
        Command::Split(args) => commands::execute_split(args),
    }
}
