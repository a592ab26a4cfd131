//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand, ValueEnum};
use secstruct_domain::FormType;
use std::path::PathBuf;

/// secstruct - segment SEC filings and extract structured JSON.
#[derive(Debug, Parser)]
#[command(name = "secstruct")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a filing through the model-backed extraction pipeline
    Process(ProcessArgs),

    /// Detect section boundaries and show the chunk plan without model calls
    Detect(DetectArgs),

    /// Parse a pre-delimited filing into the canonical structure (no model)
    Split(SplitArgs),
}

/// Which model provider backs the pipeline.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProviderKind {
    /// Google Generative Language API (requires GEMINI_API_KEY)
    Gemini,
    /// Offline mock that returns an empty completed response
    Mock,
}

fn parse_form(s: &str) -> Result<FormType, String> {
    FormType::parse(s).ok_or_else(|| format!("Unsupported form type: {}", s))
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Path to the filing text (UTF-8)
    pub input: PathBuf,

    /// Output path for the structured JSON (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filing form type (10-K, 10-Q, 8-K, 4)
    #[arg(short, long, value_parser = parse_form, default_value = "10-K")]
    pub form: FormType,

    /// Model provider
    #[arg(short, long, value_enum, default_value = "gemini")]
    pub provider: ProviderKind,

    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the detect command.
#[derive(Debug, Parser)]
pub struct DetectArgs {
    /// Path to the filing text (UTF-8)
    pub input: PathBuf,

    /// Filing form type (10-K, 10-Q, 8-K, 4)
    #[arg(short, long, value_parser = parse_form, default_value = "10-K")]
    pub form: FormType,

    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the split command.
#[derive(Debug, Parser)]
pub struct SplitArgs {
    /// Path to the pre-delimited filing text (UTF-8)
    pub input: PathBuf,

    /// Output path for the canonical JSON (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filing form type (10-K or 10-Q)
    #[arg(short, long, value_parser = parse_form, default_value = "10-K")]
    pub form: FormType,

    /// Company name recorded in the output
    #[arg(long, default_value = "Company")]
    pub company: String,

    /// Filing period recorded in the output (e.g. "2023" or "Q2 2023")
    #[arg(long, default_value = "")]
    pub period: String,
}
