//! Text normalization: raw message text -> Document (ordered bag of terms).
//!
//! Pure and stateless; safe to call from any number of tasks.

use crate::domain::Document;
use regex::Regex;
use std::sync::LazyLock;

/// Platform link markup `<url|label>`; capture group 1 is the visible label.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*\|(.*)>").expect("link pattern is valid"));

const LEADING_PUNCT: &[char] = &['\'', '"', '('];
const TRAILING_PUNCT: &[char] = &[',', ';', ':', '.', '!', '?', '\'', '"', ')'];

/// Split `text` on whitespace and normalize every token into a term.
///
/// Tokens that normalize to nothing (e.g. a lone `"` or `...`) are dropped.
pub fn tokenize(text: &str) -> Document {
    text.split_whitespace().filter_map(normalize).collect()
}

fn normalize(token: &str) -> Option<String> {
    let token = match LINK_RE.captures(token).and_then(|c| c.get(1)) {
        Some(label) => label.as_str(),
        None => token,
    };
    let term = token
        .trim_start_matches(LEADING_PUNCT)
        .trim_end_matches(TRAILING_PUNCT)
        .to_lowercase();
    (!term.is_empty()).then_some(term)
}
