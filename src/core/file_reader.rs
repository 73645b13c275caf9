//! Document reading
//!
//! Reading never fails the run: unreadable documents degrade to `None`
//! content with a skip reason, and non-UTF-8 bytes are replaced lossily.

use std::fs;
use std::path::Path;
use tracing::warn;

/// Documents above this size are not scanned (64 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Result of reading a document
#[derive(Debug, Clone)]
pub struct FileReadResult {
    /// The file content (if successfully read)
    pub content: Option<String>,

    /// Whether lossy conversion was used
    pub lossy_conversion: bool,

    /// Reason for skipping (if skipped)
    pub skip_reason: Option<String>,
}

impl FileReadResult {
    /// Create a successful read result
    pub fn success(content: String) -> Self {
        Self {
            content: Some(content),
            lossy_conversion: false,
            skip_reason: None,
        }
    }

    /// Create a skipped result
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            content: None,
            lossy_conversion: false,
            skip_reason: Some(reason.into()),
        }
    }

    /// Mark as lossy conversion
    pub fn with_lossy(mut self) -> Self {
        self.lossy_conversion = true;
        self
    }
}

/// Read a document, degrading every failure to a skipped result
pub fn read_file_safe(path: &Path) -> FileReadResult {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => return FileReadResult::skipped(format!("cannot stat: {}", e)),
    };

    if !metadata.is_file() {
        return FileReadResult::skipped("not a regular file");
    }

    if metadata.len() > DEFAULT_MAX_FILE_SIZE {
        return FileReadResult::skipped(format!(
            "file too large ({} bytes, limit {})",
            metadata.len(),
            DEFAULT_MAX_FILE_SIZE
        ));
    }

    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => return FileReadResult::skipped(format!("cannot read: {}", e)),
    };

    match String::from_utf8(bytes) {
        Ok(content) => FileReadResult::success(content),
        Err(e) => {
            let content = String::from_utf8_lossy(e.as_bytes()).into_owned();
            FileReadResult::success(content).with_lossy()
        }
    }
}

/// Read a document's text, logging and returning `None` when unreadable
pub fn read_document(path: &Path) -> Option<String> {
    let result = read_file_safe(path);
    if let Some(reason) = &result.skip_reason {
        warn!("Skipping {}: {}", path.display(), reason);
    } else if result.lossy_conversion {
        warn!("{} is not valid UTF-8, using lossy conversion", path.display());
    }
    result.content
}
