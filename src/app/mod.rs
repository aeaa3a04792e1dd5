//! Main application modules.
//!
//! This module provides utilities used by the main application before an
//! audit starts.

pub mod url;

// Re-export public API
pub use url::validate_and_normalize_url;
