//! Canonical invoice and bid record.
//!
//! Every extraction path (JSON upload, embedded payload, remote model, heuristic
//! text parser) converges on [`Invoice`]. Serialized field names are camelCase
//! so that saved files and embedded payloads stay interchangeable with form data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of document being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DocumentType {
    /// A billing invoice.
    #[default]
    Invoice,
    /// A bid or estimate.
    Bid,
}

impl DocumentType {
    /// Display label ("Invoice" or "Bid").
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "Invoice",
            DocumentType::Bid => "Bid",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How `discount_value` is applied to the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// A flat amount subtracted from the subtotal.
    #[default]
    Fixed,
    /// A percentage of the subtotal.
    Percentage,
}

/// A single line on the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    /// Combined display text: address, then work, one per line.
    pub description: String,

    /// Quantity (never negative).
    pub quantity: Decimal,

    /// Unit rate (never negative).
    pub rate: Decimal,

    /// Service address for this line.
    pub address: String,

    /// Work performed at the address.
    pub work: String,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: Decimal::ONE,
            rate: Decimal::ZERO,
            address: String::new(),
            work: String::new(),
        }
    }
}

impl LineItem {
    /// Amount for this line, saturating at [`Decimal::MAX`].
    pub fn amount(&self) -> Decimal {
        self.quantity.saturating_mul(self.rate)
    }

    /// True when the line carries nothing a user typed: no text, no rate, and
    /// either no quantity or the default quantity of one.
    pub fn is_blank(&self) -> bool {
        self.address.is_empty()
            && self.work.is_empty()
            && self.description.is_empty()
            && self.rate.is_zero()
            && (self.quantity.is_zero() || self.quantity == Decimal::ONE)
    }
}

/// A complete invoice or bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    /// Invoice or bid.
    pub document_type: DocumentType,

    /// Issuing company name.
    pub company_name: String,

    /// Issuing company address block.
    pub company_details: String,

    /// Optional logo as an opaque data string.
    pub logo: Option<String>,

    /// Document date as `YYYY-MM-DD`, or empty when unknown.
    pub invoice_date: String,

    /// Client name.
    pub client_name: String,

    /// Client address block.
    pub client_details: String,

    /// Line items, never empty once canonicalized.
    pub items: Vec<LineItem>,

    /// Tax percentage applied to the subtotal.
    pub tax_rate: Decimal,

    /// How the discount applies.
    pub discount_type: DiscountType,

    /// Discount amount or percentage.
    pub discount_value: Decimal,

    /// Free-form notes.
    pub notes: String,
}

impl Default for Invoice {
    fn default() -> Self {
        Self {
            document_type: DocumentType::Invoice,
            company_name: String::new(),
            company_details: String::new(),
            logo: None,
            invoice_date: String::new(),
            client_name: String::new(),
            client_details: String::new(),
            items: vec![LineItem::default()],
            tax_rate: Decimal::ZERO,
            discount_type: DiscountType::Fixed,
            discount_value: Decimal::ZERO,
            notes: String::new(),
        }
    }
}

/// Computed document totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    /// Sum of line amounts.
    pub subtotal: Decimal,
    /// Tax on the subtotal.
    pub tax: Decimal,
    /// Resolved discount amount.
    pub discount: Decimal,
    /// Subtotal plus tax minus discount.
    pub total: Decimal,
}

impl Invoice {
    /// Compute subtotal, tax, discount and total.
    ///
    /// Arithmetic saturates at the `Decimal` range instead of panicking.
    pub fn totals(&self) -> InvoiceTotals {
        let subtotal = self
            .items
            .iter()
            .map(LineItem::amount)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let percent_of = |value: Decimal| subtotal.saturating_mul(value) / Decimal::ONE_HUNDRED;
        let tax = percent_of(self.tax_rate);
        let discount = match self.discount_type {
            DiscountType::Percentage => percent_of(self.discount_value),
            DiscountType::Fixed => self.discount_value,
        };

        InvoiceTotals {
            subtotal,
            tax,
            discount,
            total: subtotal.saturating_add(tax).saturating_sub(discount),
        }
    }

    /// True when at least one user-meaningful value is present.
    ///
    /// Default values (empty text, zero tax and discount, a single blank line)
    /// do not count.
    pub fn has_meaningful_data(&self) -> bool {
        let text_fields = [
            &self.company_name,
            &self.company_details,
            &self.client_name,
            &self.client_details,
            &self.notes,
        ];

        text_fields.iter().any(|field| !field.trim().is_empty())
            || self.tax_rate > Decimal::ZERO
            || self.discount_value > Decimal::ZERO
            || self.items.iter().any(|item| !item.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn item(quantity: &str, rate: &str) -> LineItem {
        LineItem {
            description: "Work".to_string(),
            quantity: dec(quantity),
            rate: dec(rate),
            ..LineItem::default()
        }
    }

    #[test]
    fn test_default_record() {
        let invoice = Invoice::default();
        assert_eq!(invoice.document_type, DocumentType::Invoice);
        assert_eq!(invoice.discount_type, DiscountType::Fixed);
        assert_eq!(invoice.items, vec![LineItem::default()]);
        assert_eq!(invoice.items[0].quantity, Decimal::ONE);
        assert!(!invoice.has_meaningful_data());
    }

    #[test]
    fn test_totals_fixed_discount() {
        let invoice = Invoice {
            items: vec![item("3", "100"), item("2", "25.50")],
            tax_rate: dec("5"),
            discount_value: dec("10"),
            ..Invoice::default()
        };

        let totals = invoice.totals();
        assert_eq!(totals.subtotal, dec("351"));
        assert_eq!(totals.tax, dec("17.55"));
        assert_eq!(totals.discount, dec("10"));
        assert_eq!(totals.total, dec("358.55"));
    }

    #[test]
    fn test_totals_percentage_discount() {
        let invoice = Invoice {
            items: vec![item("4", "50")],
            discount_type: DiscountType::Percentage,
            discount_value: dec("10"),
            ..Invoice::default()
        };

        let totals = invoice.totals();
        assert_eq!(totals.discount, dec("20"));
        assert_eq!(totals.total, dec("180"));
    }

    #[test]
    fn test_totals_saturate_on_overflow() {
        let invoice = Invoice {
            items: vec![
                item("10000000000000000000", "10000000000000000000"),
                item("1", "5"),
            ],
            tax_rate: dec("10"),
            discount_value: dec("5"),
            ..Invoice::default()
        };

        assert_eq!(invoice.items[0].amount(), Decimal::MAX);
        let totals = invoice.totals();
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.tax, Decimal::MAX / Decimal::ONE_HUNDRED);
        assert_eq!(totals.discount, dec("5"));
        assert_eq!(totals.total, Decimal::MAX - dec("5"));
    }

    #[test]
    fn test_meaningful_data() {
        let mut invoice = Invoice::default();
        invoice.notes = "Thanks".to_string();
        assert!(invoice.has_meaningful_data());

        let mut invoice = Invoice::default();
        invoice.items[0].rate = dec("12");
        assert!(invoice.has_meaningful_data());

        let mut invoice = Invoice::default();
        invoice.tax_rate = dec("8.25");
        assert!(invoice.has_meaningful_data());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(Invoice::default()).unwrap();
        assert_eq!(json["documentType"], "Invoice");
        assert_eq!(json["discountType"], "fixed");
        assert!(json.get("invoiceDate").is_some());
        assert!(json["items"][0].get("work").is_some());
    }
}
