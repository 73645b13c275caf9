//! Per-document anchor cache
//!
//! Anchors come from two places:
//! - header lines (`# Title`, `## 2.5 Setup`), normalized into slugs
//! - inline `id="VALUE"` attributes, stored verbatim
//!
//! The cache is built lazily on first lookup and is never invalidated
//! during a run.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::anchors::normalize::normalize;
use crate::core::file_reader::read_document;

/// Header line: one or more `#` followed by whitespace
pub static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#+\s+(.*)$").expect("Invalid HEADER_RE regex"));

/// Explicit anchor attribute: `id="VALUE"`
pub static ID_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"id="([^"]+)""#).expect("Invalid ID_ATTR_RE regex"));

/// Extract anchors from document text, header anchors first in header order,
/// then id-attribute anchors in document order.
pub fn extract_anchors(content: &str) -> Vec<String> {
    let mut anchors: Vec<String> = content
        .lines()
        .filter_map(|line| HEADER_RE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| normalize(m.as_str())))
        .collect();

    // id attributes are kept as written, see AnchorIndex docs
    anchors.extend(
        ID_ATTR_RE
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string())),
    );

    anchors
}

/// Document -> anchors cache, keyed by absolute path.
///
/// Header anchors are normalized, id-attribute anchors are not; a query is
/// always normalized, so an `id="Mixed_Case"` attribute can never match.
#[derive(Debug, Default)]
pub struct AnchorIndex {
    entries: HashMap<PathBuf, Vec<String>>,
}

impl AnchorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the entry for `document` unless it is already cached.
    /// Unreadable documents get an empty entry.
    pub fn ensure_built(&mut self, document: &Path) {
        if self.entries.contains_key(document) {
            return;
        }

        let anchors = read_document(document)
            .map(|content| extract_anchors(&content))
            .unwrap_or_default();

        debug!(
            "Indexed {} anchor(s) in {}",
            anchors.len(),
            document.display()
        );
        self.entries.insert(document.to_path_buf(), anchors);
    }

    /// Anchors of `document`, building the entry if needed
    pub fn anchors(&mut self, document: &Path) -> &[String] {
        self.ensure_built(document);
        self.entries
            .get(document)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether `document` has been indexed
    #[allow(dead_code)]
    pub fn is_cached(&self, document: &Path) -> bool {
        self.entries.contains_key(document)
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
