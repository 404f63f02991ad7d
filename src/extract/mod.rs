//! URL extraction from free-form shared text.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://\S+").expect("valid URL pattern"));

/// Find the first `http(s)://` substring in `text`.
///
/// Returns the substring up to the next whitespace (or end of input), or
/// `None` when `text` is absent or contains no well-formed URL. Pure and
/// deterministic; there is no failure mode beyond "no match".
pub fn extract_url(text: Option<&str>) -> Option<String> {
    let text = text?;
    URL_PATTERN.find(text).map(|m| m.as_str().to_string())
}
