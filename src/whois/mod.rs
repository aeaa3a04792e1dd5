//! WHOIS registrant enrichment.
//!
//! - `types`: `RegistrantRecord` and its validity gate
//! - `parse`: registry-specific free-text scraping
//! - `invoke`: the external lookup command with a hard timeout
//! - `cache`: SQLite-backed domain -> record store
//! - `enrich`: the cache-first, bounded fan-out over cross-origin domains

mod cache;
mod enrich;
mod invoke;
mod parse;
mod types;

pub use cache::WhoisCache;
pub use enrich::{Enricher, EnrichmentSummary};
pub use invoke::{RegistryLookup, WhoisCommand};
pub use parse::{parse, ParseStrategy};
pub use types::{whois_data_valid, RegistrantRecord};
