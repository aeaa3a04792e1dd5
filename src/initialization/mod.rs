//! Application initialization.
//!
//! Sets up process-wide services the binary needs before an audit starts.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
