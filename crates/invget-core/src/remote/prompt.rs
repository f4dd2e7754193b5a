//! Prompts sent with remote extraction requests.

use chrono::NaiveDate;

/// Instructions sent alongside an inline PDF.
pub fn document_prompt() -> String {
    [
        "Extract invoice fields from this PDF and return JSON only.",
        "Use the response schema exactly.",
        "Rules:",
        "- Do not invent details that are not present.",
        "- For unknown text, use an empty string.",
        "- For unknown numeric values, use 0.",
        "- invoiceDate must be YYYY-MM-DD when possible, otherwise empty string.",
        "- discountType must be \"fixed\" or \"percentage\".",
        "- Keep every line item, and the details of that line item, as it appears in the PDF.",
        "- companyDetails and clientDetails must be address blocks in this order:",
        "  line 1: street number + street name",
        "  line 2: city, state ZIP",
        "  line 3: phone number only if present",
        "- each item.address must be two lines when possible:",
        "  line 1: street number + street name",
        "  line 2: city, state ZIP",
    ]
    .join("\n")
}

/// Instructions wrapping a natural-language request. Relative dates are
/// resolved against `today`.
pub fn chat_prompt(user_input: &str, today: NaiveDate) -> String {
    let today = today.format("%Y-%m-%d");
    [
        "Convert this user request into invoice JSON and return JSON only.".to_string(),
        "Use the response schema exactly.".to_string(),
        "Goal: infer as many fields as possible while staying grounded in provided details.".to_string(),
        "Rules:".to_string(),
        "- Prioritize explicit details from the user.".to_string(),
        "- Infer documentType as \"Bid\" when quote/estimate/proposal language is used; otherwise \"Invoice\".".to_string(),
        "- Infer missing quantity/rate/amount only when two of those values are provided.".to_string(),
        format!("- Resolve relative dates (today/tomorrow/next Friday) using {today} as today."),
        "- invoiceDate must be YYYY-MM-DD when possible, otherwise empty string.".to_string(),
        "- Normalize companyDetails, clientDetails, and item.address into multiline address blocks when possible.".to_string(),
        "- Do not invent specific names, street numbers, prices, or dates when they are not implied.".to_string(),
        "- For unknown text use empty string. For unknown numeric values use 0.".to_string(),
        "User request:".to_string(),
        user_input.trim().to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_prompt_embeds_today_and_request() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let prompt = chat_prompt("  Bid for 3 windows at $200 each \n", today);

        assert!(prompt.contains("using 2024-03-05 as today"));
        assert!(prompt.ends_with("User request:\nBid for 3 windows at $200 each"));
    }

    #[test]
    fn test_document_prompt() {
        assert!(document_prompt().starts_with("Extract invoice fields from this PDF"));
    }
}
