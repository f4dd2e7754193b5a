//! Chat command - build a record from a natural-language request.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::build_importer;
use super::load_config;
use super::output::{describe_source, emit, format_invoice, OutputFormat};

/// Arguments for the chat command.
#[derive(Args)]
pub struct ChatArgs {
    /// Request text, e.g. "invoice Jane Doe for gutter cleaning at 12 Oak St, $150"
    #[arg(required_unless_present = "file")]
    prompt: Vec<String>,

    /// Read the request from a file instead
    #[arg(long, conflicts_with = "prompt")]
    file: Option<PathBuf>,

    /// Date used to resolve "today" and relative dates (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip Gemini and use only local parsing
    #[arg(long)]
    offline: bool,

    /// Print the diagnostic log to stderr when done
    #[arg(long)]
    diagnostics: bool,
}

pub async fn run(args: ChatArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let prompt = match &args.file {
        Some(path) => fs::read_to_string(path)?,
        None => args.prompt.join(" "),
    };
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let (importer, log) = build_importer(&config, args.offline, args.diagnostics)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Building record from request...");

    let result = importer.import_prompt(&prompt, today).await;
    pb.finish_and_clear();

    if let Some(log) = &log {
        eprintln!("{}", style("Diagnostics:").bold());
        eprintln!("{}", log.render());
    }

    let imported = result?;
    eprintln!(
        "{} Built {} from {}",
        style("✓").green(),
        imported.invoice.document_type.label().to_lowercase(),
        describe_source(&imported.source)
    );

    let rendered = format_invoice(&imported.invoice, args.format)?;
    emit(&rendered, args.output.as_deref())
}
