//! Header text to anchor slug
//!
//! `## 2.5 Größe & Übersicht` becomes `2-5-grosse-ubersicht`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of anything outside the slug alphabet
static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid NON_SLUG_RE regex"));

/// Convert raw header text (or a requested `#anchor`) into its canonical slug.
///
/// Umlauts are transliterated before folding; folding first would turn them
/// into hyphens.
pub fn normalize(text: &str) -> String {
    let text = text.strip_prefix('#').unwrap_or(text);
    let lowered = text.to_lowercase();

    let mut transliterated = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match c {
            'ß' => transliterated.push_str("ss"),
            'ü' => transliterated.push('u'),
            'ö' => transliterated.push('o'),
            'ä' => transliterated.push('a'),
            other => transliterated.push(other),
        }
    }

    NON_SLUG_RE
        .replace_all(&transliterated, "-")
        .trim_matches('-')
        .to_string()
}
