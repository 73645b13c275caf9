//! Document discovery
//!
//! Uses the ignore crate walker; ignore files are not honored so the corpus
//! is exactly what is on disk under the docs root. Entries the walker cannot
//! read are logged and skipped.

use ignore::WalkBuilder;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::paths::make_relative;

/// Find documents under `root` with one of `extensions`, skipping paths whose
/// root-relative form matches `exclude`. Output is sorted.
pub fn discover_documents(
    root: &Path,
    extensions: &[String],
    exclude: Option<&Regex>,
) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false);

    let mut documents = Vec::new();

    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)));
        if !has_extension {
            continue;
        }

        if let Some(exclude) = exclude {
            let relative = make_relative(path, root).unwrap_or_default();
            if exclude.is_match(&relative) {
                continue;
            }
        }

        documents.push(path.to_path_buf());
    }

    documents.sort();
    documents
}
