//! URL validation and normalization utilities.

use log::warn;

use crate::config::MAX_URL_LENGTH;

/// Validates and normalizes a URL.
///
/// Adds https:// prefix if missing, then validates that the URL is syntactically
/// valid and uses http/https scheme. Rejects URLs longer than MAX_URL_LENGTH.
/// Logs a warning and returns None if the URL is invalid, too long, or uses an unsupported scheme.
///
/// # Arguments
///
/// * `url` - The URL string to validate and normalize
///
/// # Returns
///
/// `Some(normalized_url)` if the URL can be audited, `None` otherwise.
pub fn validate_and_normalize_url(url: &str) -> Option<String> {
    let url = url.trim();

    if url.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL exceeding maximum length ({} > {}): {}...",
            url.len(),
            MAX_URL_LENGTH,
            url.chars().take(50).collect::<String>()
        );
        return None;
    }

    // Only a bare host/path gets a scheme; an explicit one is checked below
    let normalized = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    // The https:// prefix can push a borderline URL over the limit
    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping normalized URL exceeding maximum length ({} > {})",
            normalized.len(),
            MAX_URL_LENGTH
        );
        return None;
    }

    match url::Url::parse(&normalized) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => Some(normalized),
            "http" | "https" => {
                warn!("Skipping URL without a host: {url}");
                None
            }
            _ => {
                warn!("Skipping unsupported scheme for URL: {url}");
                None
            }
        },
        Err(_) => {
            warn!("Skipping invalid URL: {url}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validate_and_normalize_url;
    use crate::config::MAX_URL_LENGTH;

    #[test]
    fn test_validate_and_normalize_url_adds_https() {
        let result = validate_and_normalize_url("example.com");
        assert_eq!(result, Some("https://example.com".to_string()));
    }

    #[test]
    fn test_validate_and_normalize_url_preserves_scheme() {
        assert_eq!(
            validate_and_normalize_url("https://example.com/path"),
            Some("https://example.com/path".to_string())
        );
        assert_eq!(
            validate_and_normalize_url("http://example.com"),
            Some("http://example.com".to_string())
        );
    }

    #[test]
    fn test_validate_and_normalize_url_trims_whitespace() {
        assert_eq!(
            validate_and_normalize_url("  example.com \n"),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn test_validate_and_normalize_url_rejects_other_schemes() {
        assert_eq!(validate_and_normalize_url("ftp://example.com"), None);
    }

    #[test]
    fn test_validate_and_normalize_url_rejects_garbage() {
        assert_eq!(validate_and_normalize_url("http://"), None);
        assert_eq!(validate_and_normalize_url("https://exa mple.com"), None);
    }

    #[test]
    fn test_validate_and_normalize_url_rejects_too_long() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert_eq!(validate_and_normalize_url(&long), None);
    }
}
