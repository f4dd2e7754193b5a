//! CLI application for invoice and bid extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{chat, config, import, payload};

/// invget - Turn PDFs, saved files and plain requests into invoice records
#[derive(Parser)]
#[command(name = "invget")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an invoice from a JSON, PDF, HTML or text file
    Import(import::ImportArgs),

    /// Build an invoice from a natural-language request
    Chat(chat::ChatArgs),

    /// Encode or decode embedded invoice payloads
    Payload(payload::PayloadArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Import(args) => import::run(args, cli.config.as_deref()).await,
        Commands::Chat(args) => chat::run(args, cli.config.as_deref()).await,
        Commands::Payload(args) => payload::run(args),
        Commands::Config(args) => config::run(args, cli.config.as_deref()),
    }
}
