//! Reducing HTML documents to plain text lines.

use crate::normalize::patterns::{BLANK_LINE_RUN, HTML_BREAK, HTML_SCRIPT_STYLE, HTML_TAG};

/// True when `text` contains something tag-shaped.
pub fn looks_like_html(text: &str) -> bool {
    HTML_TAG.is_match(text)
}

/// Strip markup, turning line breaks and block-level closing tags into
/// newlines so the heuristic parser still sees one field per line.
pub fn html_to_text(html: &str) -> String {
    let text = HTML_SCRIPT_STYLE.replace_all(html, " ");
    let text = HTML_BREAK.replace_all(&text, "\n");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = decode_entities(&text).replace('\r', "");
    BLANK_LINE_RUN.replace_all(&text, "\n\n").into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
