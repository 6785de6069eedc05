//! URL classification and arXiv identifier extraction
//!
//! Pure functions, no I/O.

use regex_lite::Regex;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^https?://(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
        )
        .expect("URL pattern is valid")
    })
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // New style 2301.12345, old style hep-th/9901001 or math.GT/0309136
        Regex::new(
            r"(?i)arxiv\.org/(?:abs|pdf)/([0-9]{4}\.[0-9]{4,5}|[a-z-]+(?:\.[a-z]{2})?/[0-9]{7})(?:v[0-9]+)?",
        )
        .expect("identifier pattern is valid")
    })
}

/// Whether `text` is an http(s) URL with a valid host
pub fn is_url(text: &str) -> bool {
    url_pattern().is_match(text.trim())
}

/// Canonical arXiv identifier for an abstract or PDF page URL, version stripped
pub fn extract_identifier(url: &str) -> Option<String> {
    identifier_pattern()
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// PDF download location for an identifier
pub fn arxiv_pdf_url(id: &str) -> String {
    format!("https://arxiv.org/pdf/{}.pdf", id)
}

/// Whether a non-repository URL is worth trying as a direct document link
pub fn is_document_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.ends_with(".pdf") || lower.contains("pdf")
}

/// Human-readable title from the last path segment of a document URL
pub fn title_from_url(url: &str) -> String {
    let trimmed = url.trim();
    let without_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    let segment = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("");

    let stem = if segment.to_ascii_lowercase().ends_with(".pdf") {
        &segment[..segment.len() - 4]
    } else {
        segment
    };

    let title = stem.replace(['_', '-'], " ").trim().to_string();
    if title.is_empty() {
        trimmed.to_string()
    } else {
        title
    }
}
