use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Collapses whitespace runs to one space, turns en dashes into hyphens and trims.
pub fn normalize(text: &str) -> String {
    WHITESPACE_RUN
        .replace_all(text, " ")
        .replace('\u{2013}', "-")
        .trim()
        .to_string()
}

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}
