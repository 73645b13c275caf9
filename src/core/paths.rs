//! Path resolution utilities
//!
//! Maps link targets to filesystem paths and classifies them as internal or
//! external relative to the configured area root.

use std::path::{Component, Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Display form of a document path: relative to root when possible
pub fn display_path(path: &Path, root: &Path) -> String {
    make_relative(path, root).unwrap_or_else(|| normalize_path(path))
}

/// Resolve a link's file part against its source document.
///
/// `/`-prefixed links are root-relative and are joined onto `docs_root`;
/// everything else (including `../`) is relative to the directory that
/// contains `source`. The result is canonicalized when the target exists,
/// otherwise `.` and `..` segments are collapsed lexically.
pub fn resolve_link_path(source: &Path, raw_link_path: &str, docs_root: &Path) -> PathBuf {
    let joined = match raw_link_path.strip_prefix('/') {
        Some(rest) => docs_root.join(rest),
        None => source
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(raw_link_path),
    };

    joined
        .canonicalize()
        .unwrap_or_else(|_| collapse_segments(&joined))
}

/// Collapse `.` and `..` components without touching the filesystem
pub fn collapse_segments(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Plain string-prefix internality test.
///
/// `/docs-old/x.md` is considered inside `/docs`; this mirrors the prefix
/// semantics of the area-root setting and is not a containment check.
pub fn is_internal(target: &Path, area_root: &Path) -> bool {
    normalize_path(target).starts_with(&normalize_path(area_root))
}

/// Number of `../` occurrences in a raw link
pub fn parent_depth(raw_link: &str) -> usize {
    raw_link.matches("../").count()
}
