//! Audit report rendering.
//!
//! `AuditReport` is the complete result of a run. It serializes to JSON as is,
//! or renders to the console layout: one block per resource type, the
//! cross-origin resources with their registrant data when enrichment ran, and
//! a framed block of grand totals.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::capture::{CaptureTotals, ResourceTypeGroup};
use crate::config::REPORT_URL_MAX_CHARS;
use crate::origin::{ComparisonOrigins, OriginMode};
use crate::whois::EnrichmentSummary;

const RULE: &str = "#####################################################";

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// URL as requested (after normalization)
    pub url: String,
    /// Page URL once navigation settled
    pub final_url: String,
    pub mode: OriginMode,
    pub comparison_origins: ComparisonOrigins,
    pub groups: Vec<ResourceTypeGroup>,
    pub totals: CaptureTotals,
    /// Present only when WHOIS enrichment ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentSummary>,
    pub elapsed_seconds: f64,
}

/// Pretty-printed JSON document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(report: &AuditReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize audit report")
}

/// Console text report.
pub fn render_text(report: &AuditReport) -> String {
    let mut out = String::new();
    let enriched = report.enrichment.is_some();

    for group in &report.groups {
        let _ = write!(
            out,
            "\nResource type: {}\nTotal: {}\nSame origin: {}\nCross-origin: {}\nCross-origin percentage: {}\n",
            group.resource_type,
            group.total_count,
            group.same_origin_count,
            group.cross_origin_count,
            percentage(group.cross_origin_percentage),
        );

        if enriched && group.cross_origin_count > 0 {
            out.push_str("Cross origin resources:\n");
            for request in group.requests.iter().filter(|r| r.is_cross_origin()) {
                let _ = write!(out, "\n  URL: {}\n", truncate(&request.url, REPORT_URL_MAX_CHARS));
                if let Some(record) = &request.registrant {
                    let _ = write!(
                        out,
                        "  Owner data:\n    Registrant Name: {}\n    Registrant Organization: {}\n    Registrant Country: {}\n",
                        record.registrant_name,
                        record.registrant_organization,
                        record.registrant_country,
                    );
                }
            }
        }
    }

    let (same, cross) = match report.mode {
        OriginMode::RootDomain => ("same root domain", "cross-domain"),
        OriginMode::ExactOrigin => ("same domain", "cross-origin"),
    };
    let totals = &report.totals;
    let _ = write!(
        out,
        "\n{RULE}\nTotal requests: {}\nTotal {same} requests: {}\nTotal {cross} requests: {}\nTotal {cross} percentage: {}\n{RULE}\n",
        totals.total_count,
        totals.same_origin_count,
        totals.cross_origin_count,
        percentage(totals.cross_origin_percentage),
    );

    if let Some(summary) = &report.enrichment {
        let _ = writeln!(
            out,
            "WHOIS: {} domains, {} from cache, {} looked up",
            summary.distinct_domains, summary.cache_hits, summary.lookups
        );
    }
    let _ = writeln!(out, "Test duration: {:.2}s", report.elapsed_seconds);

    out
}

fn percentage(value: Option<f64>) -> String {
    match value {
        Some(pct) => format!("{pct:.2}%"),
        None => "n/a".to_string(),
    }
}

/// Cuts `s` to `max` characters, the last three being `...`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}...")
}
