//! origin_audit library: same-origin / cross-origin request auditing
//!
//! This library loads a single web page in headless Chromium, records every
//! request the page makes, and classifies each one as same-origin or
//! cross-origin relative to the page (plus any trusted domains). Optionally,
//! the registrable root domain behind every cross-origin request is enriched
//! with WHOIS registrant data, cached in SQLite across runs.
//!
//! # Example
//!
//! ```no_run
//! use origin_audit::{render_text, run_audit, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     url: "https://example.com".to_string(),
//!     long: true,
//!     ..Default::default()
//! };
//!
//! let report = run_audit(config).await?;
//! println!("{}", render_text(&report));
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Page loading needs a Chromium or
//! Chrome binary, and enrichment needs a `whois` client on `PATH`.

pub mod app;
pub mod browser;
pub mod capture;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod origin;
pub mod report;
pub mod whois;

// Re-export public API
pub use browser::{ChromePageLoader, PageLoad, PageLoader};
pub use capture::{CaptureAccumulator, CaptureTotals, CapturedRequest, ResourceTypeGroup};
pub use config::{Config, LogFormat, LogLevel, OutputFormat};
pub use origin::{ComparisonOrigins, OriginMode};
pub use report::{render_json, render_text, AuditReport};
pub use run::{run_audit, run_audit_with};
pub use whois::{
    Enricher, EnrichmentSummary, RegistrantRecord, RegistryLookup, WhoisCache, WhoisCommand,
};

// Internal run module (contains the audit orchestration)
mod run {
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result};
    use log::{info, warn};
    use tokio::sync::mpsc;

    use crate::app::validate_and_normalize_url;
    use crate::browser::{ChromePageLoader, PageLoader};
    use crate::capture::CaptureAccumulator;
    use crate::config::{Config, CAPTURE_CHANNEL_CAPACITY, WHOIS_ARGS};
    use crate::origin::{ComparisonOrigins, OriginMode};
    use crate::report::AuditReport;
    use crate::whois::{Enricher, RegistryLookup, WhoisCache, WhoisCommand};

    /// Runs an audit with headless Chromium and the configured WHOIS command.
    ///
    /// This is the main entry point for the library.
    ///
    /// # Arguments
    ///
    /// * `config` - Audit configuration (URL, comparison mode, enrichment, etc.)
    ///
    /// # Returns
    ///
    /// Returns the `AuditReport`, or an error if the page could not be audited.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The URL is invalid
    /// - The browser cannot be launched or navigation fails
    pub async fn run_audit(config: Config) -> Result<AuditReport> {
        let loader = ChromePageLoader::new();
        let lookup = WhoisCommand::new(
            &config.whois_command,
            WHOIS_ARGS.iter().copied(),
            Duration::from_millis(config.lookup_timeout_ms),
        );
        run_audit_with(&config, &loader, &lookup).await
    }

    /// Runs an audit with caller-supplied page loading and registry lookup.
    ///
    /// Capture runs concurrently with navigation: the loader feeds a bounded
    /// channel that the accumulator drains until the loader finishes.
    /// Classification happens once, after capture is complete.
    ///
    /// # Errors
    ///
    /// Same as [`run_audit`].
    pub async fn run_audit_with<P, L>(
        config: &Config,
        loader: &P,
        lookup: &L,
    ) -> Result<AuditReport>
    where
        P: PageLoader,
        L: RegistryLookup,
    {
        let start_time = Instant::now();

        let url = validate_and_normalize_url(&config.url)
            .with_context(|| format!("Invalid URL: '{}'", config.url))?;
        let mode = OriginMode::from_ignore_subdomains(config.ignore_subdomains);
        info!("Starting audit of {} ({})", url, mode);

        // Without redirect following the comparison set is fixed before navigation
        let early_origins = if config.follow_redirects {
            None
        } else {
            Some(ComparisonOrigins::new(&url, &config.consider_trusted, mode))
        };

        let cache = if config.long {
            match WhoisCache::open(&config.cache_path).await {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!(
                        "Failed to open WHOIS cache at {}, enriching without it: {}",
                        config.cache_path.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        let (tx, rx) = mpsc::channel(CAPTURE_CHANNEL_CAPACITY);
        let wait = config.wait.map(Duration::from_millis);
        let (load, mut accumulator) =
            tokio::join!(loader.load(&url, wait, tx), CaptureAccumulator::collect(rx));

        let page = match load {
            Ok(page) => page,
            Err(e) => {
                if let Some(cache) = cache {
                    cache.close().await;
                }
                return Err(e);
            }
        };
        info!(
            "Captured {} requests while loading {}",
            accumulator.request_count(),
            page.final_url
        );

        let origins = match early_origins {
            Some(origins) => origins,
            None => {
                if page.final_url != url {
                    info!("Page redirected to {}", page.final_url);
                }
                ComparisonOrigins::new(&page.final_url, &config.consider_trusted, mode)
            }
        };
        accumulator.classify(&origins);

        let enrichment = if config.long {
            let enricher = match &cache {
                Some(cache) => Enricher::new(cache, lookup),
                None => Enricher::without_cache(lookup),
            };
            let summary = enricher
                .with_concurrency(config.lookup_concurrency)
                .enrich(accumulator.groups_mut())
                .await;
            if let Some(cache) = cache {
                cache.close().await;
            }
            Some(summary)
        } else {
            None
        };

        let totals = accumulator.totals();
        if totals.total_count == 0 {
            warn!("No requests were captured for {}", url);
        }

        Ok(AuditReport {
            url,
            final_url: page.final_url,
            mode,
            comparison_origins: origins,
            groups: accumulator.into_groups(),
            totals,
            enrichment,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }
}
