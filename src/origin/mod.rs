//! Origin resolution and comparison.
//!
//! This module derives the key two URLs are compared by:
//! - `exact_origin()` - scheme, host and port (`https://cdn.example.com:8443`)
//! - `root_domain()` - the registrable domain, using the Public Suffix List
//!   (`example.co.uk` for `https://www.example.co.uk/x`)
//!
//! Both return an empty string when no key can be derived. An empty key never
//! matches anything, including another empty key.

use std::collections::BTreeSet;
use std::fmt;

use log::warn;
use serde::Serialize;
use url::{Host, Url};

/// How request URLs are compared to the page. Fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginMode {
    /// Scheme + host + port must match
    ExactOrigin,
    /// Registrable domains must match (subdomains ignored)
    RootDomain,
}

impl OriginMode {
    /// Maps the `--ignore-subdomains` flag to a mode.
    pub fn from_ignore_subdomains(ignore_subdomains: bool) -> Self {
        if ignore_subdomains {
            OriginMode::RootDomain
        } else {
            OriginMode::ExactOrigin
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OriginMode::ExactOrigin => "exact-origin",
            OriginMode::RootDomain => "root-domain",
        }
    }
}

impl fmt::Display for OriginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `input` as a URL, treating scheme-less input (`example.com`) as https.
fn parse_lenient(input: &str) -> Option<Url> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match Url::parse(input) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{input}")).ok()
        }
        Err(_) => None,
    }
}

/// Returns the ASCII serialization of the URL's origin (scheme, host, port).
///
/// Default ports are omitted, so `https://example.com:443/a` and
/// `https://example.com/b` share the origin `https://example.com`.
/// Opaque origins (`data:`, `blob:` without a tuple origin, etc.) and
/// unparseable input yield an empty string.
pub fn exact_origin(url: &str) -> String {
    let Some(parsed) = parse_lenient(url) else {
        return String::new();
    };
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return String::new();
    }
    origin.ascii_serialization()
}

/// Extracts the registrable domain from a URL or bare hostname.
///
/// # Arguments
///
/// * `url` - A URL (`https://www.example.com/path`) or hostname (`www.example.com`)
///
/// # Returns
///
/// The registrable domain (e.g., "example.com"), or an empty string when the
/// input has no host, the host is an IP address, or the host is itself a
/// public suffix (`co.uk`) or a single label (`localhost`).
pub fn root_domain(url: &str) -> String {
    let Some(parsed) = parse_lenient(url) else {
        return String::new();
    };
    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.trim_end_matches('.').to_string(),
        // IP addresses do not have registrable domains
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) | None => return String::new(),
    };
    psl::domain_str(&host)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Resolves the comparison key for `url` under `mode`.
pub fn resolve(url: &str, mode: OriginMode) -> String {
    match mode {
        OriginMode::ExactOrigin => exact_origin(url),
        OriginMode::RootDomain => root_domain(url),
    }
}

/// The set of keys a run treats as "same side".
///
/// Built once from the page URL (before or after redirects) plus any trusted
/// domains. Inputs that resolve to an empty key are dropped, so the set can end
/// up empty (a `localhost` or IP page compared by root domain); every request
/// is then cross-origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonOrigins {
    mode: OriginMode,
    keys: BTreeSet<String>,
}

impl ComparisonOrigins {
    /// Builds the comparison set.
    ///
    /// # Arguments
    ///
    /// * `page_url` - The navigated (or post-redirect) page URL
    /// * `trusted` - Extra trusted domains or URLs
    /// * `mode` - Comparison mode for the run
    pub fn new<S: AsRef<str>>(page_url: &str, trusted: &[S], mode: OriginMode) -> Self {
        let keys: BTreeSet<String> = std::iter::once(page_url)
            .chain(trusted.iter().map(|entry| entry.as_ref()))
            .map(|entry| resolve(entry, mode))
            .filter(|key| !key.is_empty())
            .collect();

        if keys.is_empty() {
            warn!(
                "No {} key could be derived from '{}' or trusted domains; every request will count as cross-origin",
                mode, page_url
            );
        }

        Self { mode, keys }
    }

    pub fn mode(&self) -> OriginMode {
        self.mode
    }

    /// Whether `key` (already resolved under this set's mode) is same side.
    pub fn contains(&self, key: &str) -> bool {
        !key.is_empty() && self.keys.contains(key)
    }

    /// Resolves `url` under this set's mode and checks membership.
    pub fn is_same_side(&self, url: &str) -> bool {
        self.contains(&resolve(url, self.mode))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
