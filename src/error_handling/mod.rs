//! Error handling.
//!
//! Typed errors for the parts of the audit that can fail outright. Enrichment
//! failures are never represented here: they degrade to blank registrant
//! records instead of surfacing as errors.

mod types;

// Re-export public API
pub use types::{DatabaseError, InitializationError};
