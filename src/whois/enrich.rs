//! WHOIS enrichment of cross-origin requests.
//!
//! For every resource-type group (in order), the root domains of the group's
//! cross-origin requests are collected, deduplicated against everything
//! resolved earlier in the same call, and resolved with at most
//! `concurrency` resolutions in flight. A resolution is cache-first: a hit is
//! used as is; a miss runs the external lookup, parses its output and writes
//! the record back when it carries at least one registrant field.
//!
//! Enrichment never fails. Cache errors degrade to misses or skipped writes,
//! lookup failures degrade to blank records. Without a cache every distinct
//! domain is looked up and nothing is persisted.

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde::Serialize;

use crate::capture::ResourceTypeGroup;
use crate::config::WHOIS_CONCURRENCY;
use crate::origin::root_domain;

use super::cache::WhoisCache;
use super::invoke::RegistryLookup;
use super::parse::parse;
use super::types::{RecordSource, RegistrantRecord};

/// Counters describing one `enrich` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentSummary {
    /// Distinct non-empty root domains resolved
    pub distinct_domains: usize,
    /// Resolutions answered by the cache
    pub cache_hits: usize,
    /// External lookups performed
    pub lookups: usize,
    /// Lookup results actually written to the cache
    pub cached: usize,
}

/// Cache-first registrant resolution over classified requests.
pub struct Enricher<'a, L: RegistryLookup> {
    cache: Option<&'a WhoisCache>,
    lookup: &'a L,
    concurrency: usize,
}

impl<'a, L: RegistryLookup> Enricher<'a, L> {
    /// Creates an enricher with the default fan-out width.
    ///
    /// # Arguments
    ///
    /// * `cache` - Open WHOIS cache; must stay open for the whole `enrich` call
    /// * `lookup` - Source of raw registry text for cache misses
    pub fn new(cache: &'a WhoisCache, lookup: &'a L) -> Self {
        Self {
            cache: Some(cache),
            lookup,
            concurrency: WHOIS_CONCURRENCY,
        }
    }

    /// Creates an enricher that looks up every domain and caches nothing.
    pub fn without_cache(lookup: &'a L) -> Self {
        Self {
            cache: None,
            lookup,
            concurrency: WHOIS_CONCURRENCY,
        }
    }

    /// Sets the maximum number of resolutions in flight within one group.
    /// Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Attaches a `RegistrantRecord` to every cross-origin request in `groups`.
    ///
    /// Same-origin and unclassified requests are left untouched. Each distinct
    /// root domain is resolved at most once per call, even when several
    /// requests for it land in the same concurrent batch.
    ///
    /// # Returns
    ///
    /// Counters for the call. A second call over the same groups with the
    /// cache populated by the first reports zero lookups for every domain the
    /// first call could cache.
    pub async fn enrich(&self, groups: &mut [ResourceTypeGroup]) -> EnrichmentSummary {
        let mut resolved: HashMap<String, RegistrantRecord> = HashMap::new();
        let mut summary = EnrichmentSummary::default();

        for group in groups.iter_mut() {
            let mut pending: Vec<String> = Vec::new();
            let mut seen: HashSet<&str> = HashSet::new();
            let domains: Vec<Option<String>> = group
                .requests
                .iter()
                .map(|request| request.is_cross_origin().then(|| root_domain(&request.url)))
                .collect();

            for domain in domains.iter().flatten() {
                if !resolved.contains_key(domain) && seen.insert(domain.as_str()) {
                    pending.push(domain.clone());
                }
            }

            if !pending.is_empty() {
                info!(
                    "Collecting WHOIS data for {} {} domain{}",
                    pending.len(),
                    group.resource_type,
                    if pending.len() == 1 { "" } else { "s" }
                );
            }

            let outcomes: Vec<(String, RegistrantRecord, RecordSource)> = stream::iter(pending)
                .map(|domain| async move {
                    let (record, source) = self.resolve_domain(&domain).await;
                    (domain, record, source)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            for (domain, record, source) in outcomes {
                match source {
                    RecordSource::Cache => summary.cache_hits += 1,
                    RecordSource::Lookup { cached } => {
                        summary.lookups += 1;
                        if cached {
                            summary.cached += 1;
                        }
                    }
                    RecordSource::Skipped => {}
                }
                if !domain.is_empty() {
                    summary.distinct_domains += 1;
                }
                resolved.insert(domain, record);
            }

            for (request, domain) in group.requests.iter_mut().zip(domains) {
                let Some(domain) = domain else {
                    continue;
                };
                request.registrant = Some(
                    resolved
                        .get(&domain)
                        .cloned()
                        .unwrap_or_else(|| RegistrantRecord::blank(&domain)),
                );
            }
        }

        info!(
            "WHOIS enrichment done: {} domains, {} cache hits, {} lookups, {} newly cached",
            summary.distinct_domains, summary.cache_hits, summary.lookups, summary.cached
        );
        summary
    }

    /// Resolves one root domain: cache, then lookup + parse + write-back.
    async fn resolve_domain(&self, domain: &str) -> (RegistrantRecord, RecordSource) {
        if domain.is_empty() {
            // IP hosts, data: URLs and bare suffixes have no registrant to ask about
            return (RegistrantRecord::blank(domain), RecordSource::Skipped);
        }

        if let Some(cache) = self.cache {
            match cache.read(domain).await {
                Ok(Some(record)) => {
                    debug!("WHOIS cache hit for {}", domain);
                    return (record, RecordSource::Cache);
                }
                Ok(None) => debug!("WHOIS cache miss for {}", domain),
                Err(e) => warn!("WHOIS cache read failed for {}, treating as miss: {}", domain, e),
            }
        }

        let raw = self.lookup.lookup(domain).await;
        let record = parse(&raw, domain);

        let cached = if !record.is_valid() {
            debug!("No registrant data found for {}", domain);
            false
        } else if let Some(cache) = self.cache {
            match cache.write(&record).await {
                Ok(written) => written,
                Err(e) => {
                    warn!("Failed to cache WHOIS record for {}: {}", domain, e);
                    false
                }
            }
        } else {
            false
        };

        (record, RecordSource::Lookup { cached })
    }
}
