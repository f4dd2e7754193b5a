//! Import command - extract a record from a single file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::output::{describe_source, emit, format_invoice, OutputFormat};
use super::{build_importer, display_name, load_config};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Input file (JSON, PDF, HTML or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// MIME type hint when the file name has no useful extension
    #[arg(long)]
    mime_type: Option<String>,

    /// Skip Gemini and use only local parsing
    #[arg(long)]
    offline: bool,

    /// Print the diagnostic log to stderr when done
    #[arg(long)]
    diagnostics: bool,
}

pub async fn run(args: ImportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let content = fs::read(&args.input)?;
    let file_name = display_name(&args.input);
    info!("Importing file: {}", args.input.display());

    let (importer, log) = build_importer(&config, args.offline, args.diagnostics)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Importing {file_name}..."));

    let result = importer
        .import_file(&file_name, args.mime_type.as_deref().unwrap_or(""), &content)
        .await;
    pb.finish_and_clear();

    if let Some(log) = &log {
        eprintln!("{}", style("Diagnostics:").bold());
        eprintln!("{}", log.render());
    }

    let imported = result?;
    eprintln!(
        "{} Imported {} from {}",
        style("✓").green(),
        imported.invoice.document_type.label().to_lowercase(),
        describe_source(&imported.source)
    );

    let rendered = format_invoice(&imported.invoice, args.format)?;
    emit(&rendered, args.output.as_deref())?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
