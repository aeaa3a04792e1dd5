//! Request capture and classification.
//!
//! The browser interceptor sends one `CapturedRequest` per outgoing request
//! over a bounded channel. `CaptureAccumulator::collect` drains that channel
//! while the page loads, grouping requests by resource type in first-seen
//! order. Once capture is over, `classify` marks every request as same-origin
//! or cross-origin and computes the per-group and overall counters.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::origin::ComparisonOrigins;
use crate::whois::RegistrantRecord;

/// One intercepted network request.
///
/// `cross_origin` is `None` until classification; `registrant` is only set on
/// cross-origin requests, and only when enrichment runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRequest {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrant: Option<RegistrantRecord>,
}

impl CapturedRequest {
    /// A GET request without headers, as produced for simple subresources.
    pub fn new(url: &str, resource_type: &str) -> Self {
        Self {
            url: url.to_string(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            resource_type: resource_type.to_string(),
            cross_origin: None,
            registrant: None,
        }
    }

    pub fn is_cross_origin(&self) -> bool {
        self.cross_origin == Some(true)
    }
}

/// `cross / total * 100` rounded to two decimals; `None` when `total` is 0.
pub fn cross_origin_percentage(cross_origin_count: usize, total_count: usize) -> Option<f64> {
    if total_count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = cross_origin_count as f64 / total_count as f64 * 100.0;
    Some((pct * 100.0).round() / 100.0)
}

/// Requests sharing a resource type, plus their classification counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTypeGroup {
    pub resource_type: String,
    pub requests: Vec<CapturedRequest>,
    pub total_count: usize,
    pub same_origin_count: usize,
    pub cross_origin_count: usize,
    pub cross_origin_percentage: Option<f64>,
}

impl ResourceTypeGroup {
    fn new(resource_type: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            requests: Vec::new(),
            total_count: 0,
            same_origin_count: 0,
            cross_origin_count: 0,
            cross_origin_percentage: None,
        }
    }

    fn classify(&mut self, origins: &ComparisonOrigins) {
        let mut same = 0;
        let mut cross = 0;
        for request in &mut self.requests {
            let is_cross = !origins.is_same_side(&request.url);
            request.cross_origin = Some(is_cross);
            if is_cross {
                cross += 1;
            } else {
                same += 1;
            }
        }
        self.total_count = self.requests.len();
        self.same_origin_count = same;
        self.cross_origin_count = cross;
        self.cross_origin_percentage = cross_origin_percentage(cross, self.total_count);
    }
}

/// Counters summed over every group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureTotals {
    pub total_count: usize,
    pub same_origin_count: usize,
    pub cross_origin_count: usize,
    pub cross_origin_percentage: Option<f64>,
}

/// Owns the captured requests for the lifetime of a run.
#[derive(Debug, Default)]
pub struct CaptureAccumulator {
    groups: Vec<ResourceTypeGroup>,
    index: HashMap<String, usize>,
}

impl CaptureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains `requests` until every sender is dropped.
    pub async fn collect(mut requests: mpsc::Receiver<CapturedRequest>) -> Self {
        let mut accumulator = Self::new();
        while let Some(request) = requests.recv().await {
            accumulator.record(request);
        }
        debug!(
            "Capture finished: {} requests across {} resource types",
            accumulator.request_count(),
            accumulator.groups.len()
        );
        accumulator
    }

    /// Appends a request to its resource-type group, creating the group on first sight.
    pub fn record(&mut self, request: CapturedRequest) {
        let slot = match self.index.get(&request.resource_type) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.groups.push(ResourceTypeGroup::new(&request.resource_type));
                self.index.insert(request.resource_type.clone(), slot);
                slot
            }
        };
        self.groups[slot].requests.push(request);
    }

    /// Marks every request same-origin or cross-origin and recomputes counters.
    ///
    /// Counters are rebuilt from scratch, so calling this again with the same
    /// origins leaves the accumulator unchanged. Must not run while capture is
    /// still feeding `record`.
    pub fn classify(&mut self, origins: &ComparisonOrigins) {
        for group in &mut self.groups {
            group.classify(origins);
        }
    }

    pub fn groups(&self) -> &[ResourceTypeGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [ResourceTypeGroup] {
        &mut self.groups
    }

    pub fn into_groups(self) -> Vec<ResourceTypeGroup> {
        self.groups
    }

    pub fn request_count(&self) -> usize {
        self.groups.iter().map(|g| g.requests.len()).sum()
    }

    /// Sums the per-group counters. Meaningful after `classify`.
    pub fn totals(&self) -> CaptureTotals {
        totals_of(&self.groups)
    }
}

/// Sums the counters of already classified groups.
pub fn totals_of(groups: &[ResourceTypeGroup]) -> CaptureTotals {
    let (total, same, cross) = groups.iter().fold((0, 0, 0), |(t, s, c), g| {
        (
            t + g.total_count,
            s + g.same_origin_count,
            c + g.cross_origin_count,
        )
    });
    CaptureTotals {
        total_count: total,
        same_origin_count: same,
        cross_origin_count: cross,
        cross_origin_percentage: cross_origin_percentage(cross, total),
    }
}
