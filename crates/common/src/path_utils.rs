//! Object key helpers for emulating a directory hierarchy.
//!
//! Object stores have flat key spaces. A hierarchy is imposed by splitting
//! keys on [`DELIMITER`]: a key ending in the delimiter is a directory marker,
//! and any shared prefix ending in the delimiter is an implicit directory.

use crate::constants::{DELIMITER, ROOT_NAME};

/// Lexically normalize an object key.
///
/// Removes empty and `.` segments and resolves `..` segments. A `..` that
/// would climb above the bucket root is dropped. The result never starts or
/// ends with the delimiter; the bucket root normalizes to the empty string.
///
/// # Arguments
/// * `key` - Key or path to normalize
///
/// # Returns
/// Normalized key.
pub fn clean_key(key: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in key.split(DELIMITER) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    segments.join("/")
}

/// Check whether a key names a directory marker (ends with the delimiter).
pub fn is_dir_key(key: &str) -> bool {
    key.ends_with(DELIMITER)
}

/// Listing prefix that enumerates the children of `key`.
///
/// Leading delimiters are stripped because object stores treat them as part
/// of the key. A trailing delimiter is appended unless the key already names
/// a directory, so that listing `dir` yields `dir/*` and not `dir*`.
/// The bucket root lists with an empty prefix.
///
/// # Arguments
/// * `key` - Path of the directory to list
///
/// # Returns
/// Prefix suitable for a delimited ListObjectsV2 request.
pub fn dir_prefix(key: &str) -> String {
    let trimmed: &str = key.trim_start_matches(DELIMITER);
    if trimmed.is_empty() || is_dir_key(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, DELIMITER)
    }
}

/// Last path segment of a key, ignoring trailing delimiters.
///
/// # Arguments
/// * `key` - Key, common prefix, or path
///
/// # Returns
/// The base name, or [`ROOT_NAME`] when the key has no segments.
pub fn base_name(key: &str) -> String {
    let cleaned: String = clean_key(key);
    match cleaned.rsplit(DELIMITER).next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ROOT_NAME.to_string(),
    }
}
