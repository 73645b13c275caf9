//! Anchor resolution
//!
//! Matching order, first success wins:
//! 1. exact slug match
//! 2. numbered-section fuzz: `25-setup` also tries `2-5-setup`
//! 3. suffix match: `setup` matches `2-5-setup` when the request carries no
//!    `N-N-` prefix of its own

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::anchors::index::AnchorIndex;
use crate::anchors::normalize::normalize;

/// `25-troubleshooting` -> (`2`, `5`, `troubleshooting`)
static COLLAPSED_SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9])([0-9]+)-(.+)$").expect("Invalid COLLAPSED_SECTION_RE regex")
});

/// Leading `N-N-` section number
static SECTION_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+-[0-9]+-").expect("Invalid SECTION_PREFIX_RE regex"));

/// Which heuristic resolved an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMatch {
    Exact,
    NumberedSection,
    Suffix,
}

/// Match an already-normalized anchor against a document's anchors
pub fn match_anchor(anchors: &[String], wanted: &str) -> Option<AnchorMatch> {
    if anchors.iter().any(|a| a == wanted) {
        return Some(AnchorMatch::Exact);
    }

    if let Some(caps) = COLLAPSED_SECTION_RE.captures(wanted) {
        let fuzzed = format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
        if anchors.iter().any(|a| *a == fuzzed) {
            return Some(AnchorMatch::NumberedSection);
        }
    }

    if !SECTION_PREFIX_RE.is_match(wanted) {
        let suffix_hit = anchors.iter().any(|a| {
            SECTION_PREFIX_RE
                .find(a)
                .is_some_and(|prefix| &a[prefix.end()..] == wanted)
        });
        if suffix_hit {
            return Some(AnchorMatch::Suffix);
        }
    }

    None
}

/// Resolve `requested` (with or without its leading `#`) in `document`
pub fn resolve_anchor(
    index: &mut AnchorIndex,
    document: &Path,
    requested: &str,
) -> Option<AnchorMatch> {
    let wanted = normalize(requested);
    let found = match_anchor(index.anchors(document), &wanted);

    if let Some(kind) = found {
        debug!(
            "Resolved #{} in {} via {:?} match",
            wanted,
            document.display(),
            kind
        );
    }
    found
}

/// Whether `requested` exists in `document` under any heuristic
pub fn anchor_exists(index: &mut AnchorIndex, document: &Path, requested: &str) -> bool {
    resolve_anchor(index, document, requested).is_some()
}
