//! Shared constants used across the notes crates.

/// Default API port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default number of ids reserved per sequence lease.
pub const DEFAULT_ID_LEASE_SIZE: u64 = 100;

/// Default cap on concurrent tag lookups while resolving one note.
pub const DEFAULT_MAX_TAG_LOOKUPS: usize = 8;

/// Default upper bound for search result sets.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Default request timeout applied by the HTTP layer, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Default directory served for non-API routes.
pub const DEFAULT_STATIC_DIR: &str = "./static";

/// Memory budget handed to the search index writer.
pub const SEARCH_WRITER_MEMORY_BYTES: usize = 50_000_000;
