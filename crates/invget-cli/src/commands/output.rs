//! Rendering of imported records.

use std::fs;
use std::path::Path;

use console::style;

use invget_core::models::invoice::Invoice;
use invget_core::ImportSource;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON record
    Json,
    /// One CSV row per line item
    Csv,
    /// Plain text summary
    Text,
}

pub fn format_invoice(invoice: &Invoice, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(invoice)?),
        OutputFormat::Csv => format_csv(invoice),
        OutputFormat::Text => Ok(format_text(invoice)),
    }
}

/// Write to `output` when given, stdout otherwise.
pub fn emit(rendered: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, rendered)?;
            eprintln!("{} Output written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

pub fn describe_source(source: &ImportSource) -> String {
    match source {
        ImportSource::Json => "saved JSON".to_string(),
        ImportSource::EmbeddedPayload => "embedded payload".to_string(),
        ImportSource::Remote { model } => format!("Gemini ({model})"),
        ImportSource::LocalParser => "local parser".to_string(),
    }
}

fn format_csv(invoice: &Invoice) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "document_type",
        "invoice_date",
        "company_name",
        "client_name",
        "address",
        "work",
        "quantity",
        "rate",
        "amount",
    ])?;

    for item in &invoice.items {
        wtr.write_record([
            invoice.document_type.label(),
            &invoice.invoice_date,
            &invoice.company_name,
            &invoice.client_name,
            &item.address,
            &item.work,
            &item.quantity.normalize().to_string(),
            &item.rate.round_dp(2).to_string(),
            &item.amount().round_dp(2).to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(invoice: &Invoice) -> String {
    let mut output = String::new();
    let totals = invoice.totals();

    output.push_str(&format!("{}\n", invoice.document_type));
    if !invoice.invoice_date.is_empty() {
        output.push_str(&format!("Date: {}\n", invoice.invoice_date));
    }
    output.push('\n');

    push_party(&mut output, "From", &invoice.company_name, &invoice.company_details);
    push_party(&mut output, "Bill to", &invoice.client_name, &invoice.client_details);

    output.push_str("Items:\n");
    for item in &invoice.items {
        let label = item.description.lines().collect::<Vec<_>>().join(" / ");
        output.push_str(&format!(
            "  {:<40} {:>6} x {:>10} = {:>10}\n",
            label,
            item.quantity.normalize(),
            item.rate.round_dp(2),
            item.amount().round_dp(2)
        ));
    }
    output.push('\n');

    output.push_str(&format!("  Subtotal: {}\n", totals.subtotal.round_dp(2)));
    if !totals.tax.is_zero() {
        output.push_str(&format!("  Tax ({}%): {}\n", invoice.tax_rate.normalize(), totals.tax.round_dp(2)));
    }
    if !totals.discount.is_zero() {
        output.push_str(&format!("  Discount: -{}\n", totals.discount.round_dp(2)));
    }
    output.push_str(&format!("  Total:    {}\n", totals.total.round_dp(2)));

    if !invoice.notes.is_empty() {
        output.push_str(&format!("\nNotes:\n{}\n", invoice.notes));
    }

    output
}

fn push_party(output: &mut String, heading: &str, name: &str, details: &str) {
    if name.is_empty() && details.is_empty() {
        return;
    }
    output.push_str(&format!("{heading}:\n"));
    for line in std::iter::once(name).chain(details.lines()).filter(|l| !l.is_empty()) {
        output.push_str(&format!("  {line}\n"));
    }
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use invget_core::models::invoice::LineItem;
    use rust_decimal::Decimal;

    fn sample() -> Invoice {
        Invoice {
            company_name: "ACME Roofing".to_string(),
            client_name: "Jane Doe".to_string(),
            invoice_date: "2024-03-05".to_string(),
            tax_rate: Decimal::from(10),
            items: vec![LineItem {
                description: "12 Oak St\nGutter cleaning".to_string(),
                quantity: Decimal::from(2),
                rate: Decimal::from(75),
                address: "12 Oak St".to_string(),
                work: "Gutter cleaning".to_string(),
            }],
            ..Invoice::default()
        }
    }

    #[test]
    fn test_csv_has_row_per_item() {
        let csv = format_invoice(&sample(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Invoice,2024-03-05,ACME Roofing,Jane Doe,12 Oak St,Gutter cleaning,2,75,150"
        );
    }

    #[test]
    fn test_text_summary() {
        let text = format_invoice(&sample(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("Invoice\nDate: 2024-03-05"));
        assert!(text.contains("Bill to:\n  Jane Doe"));
        assert!(text.contains("Tax (10%): 15"));
        assert!(text.contains("Total:    165"));
        assert!(!text.contains("Discount"));
    }
}
