use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").expect("static regex")
});

/// Find the exposure CSV link in the page HTML.
///
/// Only `<script>` bodies are searched; the page embeds the link in an inline
/// script rather than an anchor. Returns the first match.
pub fn find_csv_location(html: &str, csv_pattern: &Regex) -> Option<String> {
    SCRIPT_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .find_map(|body| csv_pattern.find(body.as_str()))
        .map(|m| m.as_str().to_string())
}
