//! Flows module - Link validation workflows
//!
//! - links: Markdown link extraction
//! - validate: per-link validation state machine
//! - mutate: batch-fix and TODO edits on source documents
//! - scan: sequential/parallel orchestration over a document list

pub mod links;
pub mod mutate;
pub mod scan;
pub mod validate;
