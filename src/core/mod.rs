//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Link result model and run statistics
//! - Run configuration
//! - Rendering functions for text and JSON output
//! - Path resolution utilities
//! - Safe document reading

pub mod config;
pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
