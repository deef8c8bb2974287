//! Shared constants used across bucketfs crates.

/// Character used to impose a hierarchy over flat object keys.
pub const DELIMITER: char = '/';

/// Same delimiter as a string slice, for APIs that take `&str`.
pub const DELIMITER_STR: &str = "/";

/// Extra bytes requested beyond each read (64KB).
/// Amortizes round trips for sequential access patterns.
pub const DEFAULT_READ_AHEAD_BYTES: u64 = 64 * 1024;

/// Page size used when a directory is listed in one call.
pub const DEFAULT_LIST_PAGE_SIZE: usize = 1000;

/// Upper bound S3 accepts for `max-keys` on a single ListObjectsV2 request.
pub const MAX_LIST_PAGE_SIZE: usize = 1000;

/// Name reported for the bucket root.
pub const ROOT_NAME: &str = "/";

/// Mode bits for files: rw for owner and group, r for others.
pub const FILE_MODE: u32 = 0o664;

/// Mode bits for directories: rwx for owner and group, rx for others.
pub const DIR_MODE: u32 = 0o775;
