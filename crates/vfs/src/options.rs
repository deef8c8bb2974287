//! Configuration options for the VFS.
//!
//! This module provides configuration for read-ahead and directory listing.
//! Options deserialize with `serde`, and every missing field falls back to
//! its default, so hosts can embed them in their own config files.

use bucketfs_common::{DEFAULT_LIST_PAGE_SIZE, DEFAULT_READ_AHEAD_BYTES, MAX_LIST_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// Configuration options for the VFS.
///
/// # Example
///
/// ```ignore
/// let options = VfsOptions::default()
///     .with_read_ahead(ReadAheadOptions::with_bytes(1024 * 1024))
///     .with_listing(ListingOptions::with_page_size(500));
///
/// let fs = BucketFs::new(client, "bucket").with_options(options);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfsOptions {
    /// Read-ahead configuration.
    pub read_ahead: ReadAheadOptions,
    /// Directory listing configuration.
    pub listing: ListingOptions,
}

impl VfsOptions {
    /// Set read-ahead options.
    ///
    /// # Arguments
    /// * `read_ahead` - Read-ahead configuration
    pub fn with_read_ahead(mut self, read_ahead: ReadAheadOptions) -> Self {
        self.read_ahead = read_ahead;
        self
    }

    /// Set listing options.
    ///
    /// # Arguments
    /// * `listing` - Listing configuration
    pub fn with_listing(mut self, listing: ListingOptions) -> Self {
        self.listing = listing;
        self
    }
}

// ============================================================================
// Read-Ahead Options
// ============================================================================

/// Options for read-ahead behavior.
///
/// Each range request asks for the caller's buffer size plus `bytes`, so
/// sequential reads are served from one open stream instead of one request
/// per read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadAheadOptions {
    /// Extra bytes requested beyond each read.
    pub bytes: u64,
}

impl Default for ReadAheadOptions {
    fn default() -> Self {
        Self {
            bytes: DEFAULT_READ_AHEAD_BYTES,
        }
    }
}

impl ReadAheadOptions {
    /// Create options with a custom read-ahead size.
    pub fn with_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    /// Create options with no read-ahead; every read fetches exactly the
    /// bytes asked for.
    pub fn disabled() -> Self {
        Self { bytes: 0 }
    }
}

// ============================================================================
// Listing Options
// ============================================================================

/// Options for directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingOptions {
    /// Keys requested per page when a directory is listed in one call.
    pub page_size: usize,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_LIST_PAGE_SIZE,
        }
    }
}

impl ListingOptions {
    /// Create options with a custom page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self { page_size }
    }

    /// Page size clamped to what a single ListObjectsV2 request accepts.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_LIST_PAGE_SIZE)
    }
}

// ============================================================================
// Tests
// ============================================================================
