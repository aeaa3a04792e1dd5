//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including lookup timeouts, concurrency widths, and output limits.

// constants (used as defaults)

/// Maximum WHOIS resolutions in flight within one resource-type group
pub const WHOIS_CONCURRENCY: usize = 30;

/// Wall-clock limit for a single external WHOIS lookup in milliseconds.
/// The process is killed when this fires; whatever stdout was collected is kept.
pub const WHOIS_TIMEOUT_MS: u64 = 5000;

/// External lookup program and the flags passed before the domain
pub const WHOIS_PROGRAM: &str = "whois";
pub const WHOIS_ARGS: &[&str] = &["-R"];

/// Default location of the WHOIS cache (SQLite file)
pub const DEFAULT_CACHE_PATH: &str = "./whois-cache.sqlite3";

/// Maximum pooled connections to the on-disk WHOIS cache
pub const CACHE_POOL_MAX_CONNECTIONS: u32 = 4;

/// Capacity of the channel between the browser interceptor and the capture accumulator
pub const CAPTURE_CHANNEL_CAPACITY: usize = 256;

/// Maximum URL length (2048 characters), matching common browser and server limits
pub const MAX_URL_LENGTH: usize = 2048;

/// URLs longer than this are truncated in the console report
pub const REPORT_URL_MAX_CHARS: usize = 100;
