//! Payload command - embed a record in text or read one back.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use invget_core::pdf::extract_pdf_text;
use invget_core::{encode_payload, extract_embedded_invoice, import_json};

use super::output::{emit, format_invoice, OutputFormat};

/// Arguments for the payload command.
#[derive(Args)]
pub struct PayloadArgs {
    #[command(subcommand)]
    command: PayloadCommand,
}

#[derive(Subcommand)]
enum PayloadCommand {
    /// Encode a saved JSON record as a payload block
    Encode {
        /// JSON file holding the record
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find and decode a payload block in a text or PDF file
    Decode {
        /// Text or PDF file containing the payload
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

pub fn run(args: PayloadArgs) -> anyhow::Result<()> {
    match args.command {
        PayloadCommand::Encode { input, output } => {
            let raw = fs::read_to_string(&input)?;
            let invoice = import_json(&raw)?;
            emit(&encode_payload(&invoice)?, output.as_deref())
        }
        PayloadCommand::Decode {
            input,
            output,
            format,
        } => {
            let content = fs::read(&input)?;
            let text = if content.starts_with(b"%PDF-") {
                extract_pdf_text(&content)?
            } else {
                String::from_utf8_lossy(&content).into_owned()
            };

            let invoice = extract_embedded_invoice(&text).ok_or_else(|| {
                anyhow::anyhow!("No invoice payload found in {}", input.display())
            })?;
            emit(&format_invoice(&invoice, format)?, output.as_deref())
        }
    }
}
