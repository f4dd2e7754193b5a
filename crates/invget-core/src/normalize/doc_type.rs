//! Document type inference.

use crate::models::invoice::DocumentType;

use super::patterns::BID_WORD;

/// `Bid` when the text contains the standalone word "bid", else `Invoice`.
pub fn infer_document_type(text: &str) -> DocumentType {
    if BID_WORD.is_match(text) {
        DocumentType::Bid
    } else {
        DocumentType::Invoice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_document_type() {
        assert_eq!(infer_document_type("BID for roof repair"), DocumentType::Bid);
        assert_eq!(infer_document_type("kitchen-bid.pdf\nACME"), DocumentType::Bid);
        assert_eq!(infer_document_type("Bidding schedule"), DocumentType::Invoice);
        assert_eq!(infer_document_type("Invoice"), DocumentType::Invoice);
        assert_eq!(infer_document_type(""), DocumentType::Invoice);
    }
}
