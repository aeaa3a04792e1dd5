//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_CACHE_PATH, WHOIS_CONCURRENCY, WHOIS_PROGRAM, WHOIS_TIMEOUT_MS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Console text report (default)
    Text,
    /// Pretty-printed JSON document
    Json,
}

/// Audit configuration.
///
/// Parsed from the command line by the binary, but can be constructed
/// programmatically by library users as well.
///
/// # Examples
///
/// ```no_run
/// use origin_audit::Config;
///
/// let config = Config {
///     url: "https://example.com".to_string(),
///     ignore_subdomains: true,
///     long: true,
///     ..Default::default()
/// };
/// ```
///
/// ```bash
/// # Exact-origin comparison, counts only
/// origin_audit --url https://example.com
///
/// # Root-domain comparison with WHOIS enrichment and JSON output
/// origin_audit --url example.com --ignore-subdomains -l --output json
///
/// # Treat a CDN as first party
/// origin_audit --url example.com --consider-trusted cdn.example.net --wait 2000
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "origin_audit",
    about = "Counts same-origin and cross-origin requests made while loading a web page."
)]
pub struct Config {
    /// Page to audit (https:// is assumed when the scheme is missing)
    #[arg(long)]
    pub url: String,

    /// Compare registrable root domains instead of exact origins
    #[arg(long)]
    pub ignore_subdomains: bool,

    /// Additional trusted domains or URLs counted as same origin
    #[arg(long, value_delimiter = ',')]
    pub consider_trusted: Vec<String>,

    /// Milliseconds to keep capturing after navigation completes
    #[arg(long)]
    pub wait: Option<u64>,

    /// Compare against the page URL after redirects instead of the requested URL
    #[arg(long)]
    pub follow_redirects: bool,

    /// Collect WHOIS registrant data for cross-origin domains
    #[arg(short = 'l', long)]
    pub long: bool,

    /// Report format: text|json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// WHOIS cache path (SQLite file)
    #[arg(long, value_parser, default_value = DEFAULT_CACHE_PATH)]
    pub cache_path: PathBuf,

    /// Maximum concurrent WHOIS resolutions per resource type
    #[arg(long, default_value_t = WHOIS_CONCURRENCY)]
    pub lookup_concurrency: usize,

    /// Per-lookup timeout in milliseconds
    #[arg(long, default_value_t = WHOIS_TIMEOUT_MS)]
    pub lookup_timeout_ms: u64,

    /// WHOIS program, invoked as `<program> -R <domain>`
    #[arg(long, default_value = WHOIS_PROGRAM)]
    pub whois_command: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            ignore_subdomains: false,
            consider_trusted: Vec::new(),
            wait: None,
            follow_redirects: false,
            long: false,
            output: OutputFormat::Text,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            lookup_concurrency: WHOIS_CONCURRENCY,
            lookup_timeout_ms: WHOIS_TIMEOUT_MS,
            whois_command: WHOIS_PROGRAM.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
