//! Shared types and utilities for bucketfs.
//!
//! This crate provides common functionality used across all bucketfs crates:
//! - Object key helpers that emulate a directory hierarchy over flat keys
//! - Shared constants (delimiter, read-ahead and listing defaults)

pub mod constants;
pub mod path_utils;

// Re-export commonly used items at crate root
pub use constants::*;
pub use path_utils::{base_name, clean_key, dir_prefix, is_dir_key};
