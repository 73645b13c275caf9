//! Link extraction
//!
//! Finds Markdown inline links and images per line:
//! `[text](target)`, `![alt](target "Title")`, `[text](<target with spaces>)`

use once_cell::sync::Lazy;
use regex::Regex;

/// Inline link or image with optional title
pub static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"!?\[([^\]]*)\]\(\s*(?:<([^>]*)>|([^)\s]*))(?:\s+"[^"]*")?\s*\)"#)
        .expect("Invalid LINK_RE regex")
});

/// A link occurrence in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// 1-indexed line number
    pub line: usize,
    /// Raw target (`path`, `path#anchor`, `#anchor`, or a URL)
    pub target: String,
    /// Link text or image alt text
    pub text: String,
    /// Full markup as written, e.g. `[text](target)`
    pub markup: String,
}

/// Extract links from one line
pub fn extract_line_links(line: &str, line_num: usize) -> Vec<Link> {
    LINK_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let target = caps.get(2).or_else(|| caps.get(3))?.as_str().trim();
            if target.is_empty() {
                return None;
            }
            Some(Link {
                line: line_num,
                target: target.to_string(),
                text: caps
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                markup: caps.get(0)?.as_str().to_string(),
            })
        })
        .collect()
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Extract links from a whole document, skipping fenced code blocks
pub fn extract_links(content: &str) -> Vec<Link> {
    let mut links = Vec::new();
    let mut in_fence = false;

    for (idx, line) in content.lines().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        links.extend(extract_line_links(line, idx + 1));
    }

    links
}
