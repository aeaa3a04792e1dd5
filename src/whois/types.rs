//! WHOIS data structures.

use serde::{Deserialize, Serialize};

/// Registrant metadata scraped from a registry lookup.
///
/// Every field defaults to the empty string; a record scraped from garbled or
/// empty registry output is blank rather than missing. `domain` is the
/// registrable root domain the record was looked up for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantRecord {
    pub domain: String,
    pub registrant_name: String,
    pub registrant_organization: String,
    pub registrant_country: String,
}

impl RegistrantRecord {
    /// A blank record for `domain`.
    pub fn blank(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    /// True if at least one registrant field is non-empty.
    pub fn is_valid(&self) -> bool {
        whois_data_valid(self)
    }
}

/// Validity gate for caching: a record is worth keeping only if the lookup
/// produced at least one registrant field.
pub fn whois_data_valid(record: &RegistrantRecord) -> bool {
    !record.registrant_name.is_empty()
        || !record.registrant_organization.is_empty()
        || !record.registrant_country.is_empty()
}

/// Where a resolved record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordSource {
    Cache,
    /// `cached` is set only when the record was written back
    Lookup { cached: bool },
    /// No usable root domain, nothing was consulted
    Skipped,
}
