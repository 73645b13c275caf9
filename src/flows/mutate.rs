//! In-place document edits for batch fixes and TODO markers
//!
//! Every edit is a literal replacement of the first occurrence of a needle
//! on one specific line; no pattern syntax is involved, so link text with
//! regex metacharacters or delimiters cannot corrupt other content.
//!
//! The edited document is written to a temporary file next to it and renamed
//! into place, so concurrent readers see either the old or the new content.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Replace the first literal occurrence of `needle` on `line` (1-indexed).
/// Line endings and the rest of the document are preserved byte for byte.
pub fn replace_on_line(
    content: &str,
    line: usize,
    needle: &str,
    replacement: &str,
) -> Result<String> {
    if line == 0 {
        bail!("Line numbers are 1-indexed, got 0");
    }

    let mut output = String::with_capacity(content.len() + replacement.len());
    let mut replaced = false;

    for (idx, segment) in content.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            if !segment.contains(needle) {
                bail!("'{}' not found on line {}", needle, line);
            }
            output.push_str(&segment.replacen(needle, replacement, 1));
            replaced = true;
        } else {
            output.push_str(segment);
        }
    }

    if !replaced {
        bail!("line {} is beyond the end of the document", line);
    }

    Ok(output)
}

fn edit_line(path: &Path, line: usize, needle: &str, replacement: &str) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let new_content = replace_on_line(&content, line, needle, replacement)
        .with_context(|| format!("Failed to edit {}", path.display()))?;
    write_atomic(path, &new_content)
}

/// Replace `path` with `content` via a sibling temp file and a rename
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    temp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;

    // Keep the original permissions on the replacement
    if let Ok(metadata) = fs::metadata(path) {
        let _ = fs::set_permissions(temp.path(), metadata.permissions());
    }

    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Rewrite the target of the link occurrence `markup` on `line`
pub fn rewrite_link_target(
    path: &Path,
    line: usize,
    markup: &str,
    old_target: &str,
    new_target: &str,
) -> Result<()> {
    // Only the part after `](` holds the target; link text may repeat it
    let split = markup.find("](").map_or(0, |i| i + 2);
    let (head, tail) = markup.split_at(split);
    let new_markup = format!("{}{}", head, tail.replacen(old_target, new_target, 1));
    edit_line(path, line, markup, &new_markup)?;
    info!(
        "Fixed {}:{}: {} -> {}",
        path.display(),
        line,
        old_target,
        new_target
    );
    Ok(())
}

/// Plain-text placeholder that replaces a dead link
pub fn todo_marker(text: &str, target_base_name: &str) -> String {
    if text.trim().is_empty() {
        format!("TODO: {}", target_base_name)
    } else {
        format!("{} (TODO: {})", text, target_base_name)
    }
}

/// Replace the link markup on `line` with a TODO marker, returning the marker
pub fn mark_todo(
    path: &Path,
    line: usize,
    markup: &str,
    text: &str,
    base_name: &str,
) -> Result<String> {
    let marker = todo_marker(text, base_name);
    edit_line(path, line, markup, &marker)?;
    info!("Marked TODO at {}:{} for {}", path.display(), line, base_name);
    Ok(marker)
}
