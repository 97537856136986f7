//! Filter list URL validation.
//!
//! Used by config validation and by the fetcher, so a URL that passes
//! `AppConfig::validate` is exactly one the fetcher will request.

use url::Url;

/// Error type for filter list URL validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a filter list location into a request URL.
///
/// The input must be absolute; unlike page links there is no base to
/// resolve against. Surrounding whitespace and any fragment are dropped,
/// the query string is kept as-is (list mirrors often use it for versioning).
pub fn filter_list_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
