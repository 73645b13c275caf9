//! Backends module - Filesystem and external tool integrations
//!
//! Provides:
//! - scan: Document discovery with the ignore walker
//! - history: git-backed file history probe for auto-TODO

pub mod history;
pub mod scan;
