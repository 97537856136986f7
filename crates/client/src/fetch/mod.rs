//! Filter list download pipeline.
//!
//! ### Request
//! - One GET per call, `Accept: text/plain`, redirects limited to 5.
//! - No retry. A timeout applies only when one is configured.
//!
//! ### Body Checks
//! - Non-2xx status is an error rather than a list to parse. This departs
//!   on purpose from reading the body whatever the status: an error page
//!   must never be stored over the cached list or stamp a fresh timestamp.
//! - Max body bytes: 20MB (configurable).
//! - The body must be valid UTF-8; a leading byte-order mark is stripped.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};

pub use cosmetic_core::{UrlError, filter_list_url};

use cosmetic_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "cosmetic-filter/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 20MB)
    pub max_bytes: usize,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "cosmetic-filter/0.1".to_string(),
            max_bytes: 20 * 1024 * 1024,
            timeout: None,
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Decode the body as UTF-8 text.
    pub fn text(&self) -> Result<String, Error> {
        let text = std::str::from_utf8(&self.bytes).map_err(|e| {
            Error::NonTextBody(format!(
                "{} ({}): {}",
                self.final_url,
                self.content_type.as_deref().unwrap_or("no content-type"),
                e
            ))
        })?;
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}

/// HTTP fetch client for filter lists.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/plain, */*;q=0.8")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(FetchResponse { final_url, status, content_type, bytes, fetch_ms })
    }

    /// Fetch a URL and decode the body as text.
    pub async fn fetch_text(&self, url: &Url) -> Result<String, Error> {
        self.fetch(url).await?.text()
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::FetchTimeout(format!("no response within {:?}", self.config.timeout.unwrap_or_default()))
        } else {
            Error::HttpError(format!("network error: {}", err))
        }
    }
}

/// Source of raw filter list text.
///
/// The orchestrator only depends on this trait, so a list can come from
/// the network, a file, or a fixture.
#[async_trait]
pub trait FilterSource: Send + Sync {
    /// Download the full filter list.
    async fn fetch_list(&self) -> Result<String, Error>;
}

/// A filter list published at a fixed URL.
pub struct RemoteFilterList {
    client: FetchClient,
    url: Url,
}

impl RemoteFilterList {
    /// Create a source for `url`, validating it up front.
    pub fn new(url: &str, config: FetchConfig) -> Result<Self, Error> {
        let url = filter_list_url(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let client = FetchClient::new(config)?;
        Ok(Self { client, url })
    }

    /// Build the source described by the application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(&config.filter_url, FetchConfig::from(config))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl FilterSource for RemoteFilterList {
    async fn fetch_list(&self) -> Result<String, Error> {
        tracing::debug!(url = %self.url, "downloading filter list");
        self.client.fetch_text(&self.url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(bytes: &'static [u8]) -> FetchResponse {
        FetchResponse {
            final_url: Url::parse("https://filters.example.org/2.txt").unwrap(),
            status: StatusCode::OK,
            content_type: Some("text/plain; charset=utf-8".to_string()),
            bytes: Bytes::from_static(bytes),
            fetch_ms: 12,
        }
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "cosmetic-filter/0.1");
        assert_eq!(config.max_bytes, 20 * 1024 * 1024);
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "ua/1".into(), max_bytes: 1024, timeout_ms: Some(2000), ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "ua/1");
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.timeout, Some(Duration::from_millis(2000)));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_response_text_strips_bom() {
        let text = response(b"\xef\xbb\xbf! Title\n##.ad").text().unwrap();
        assert_eq!(text, "! Title\n##.ad");
    }

    #[test]
    fn test_response_text_rejects_binary() {
        let result = response(b"\xff\xfe\x00binary").text();
        assert!(matches!(result, Err(Error::NonTextBody(_))));
    }

    #[tokio::test]
    async fn test_remote_list_validates_url() {
        assert!(RemoteFilterList::new("ftp://example.org/list.txt", FetchConfig::default()).is_err());

        let source = RemoteFilterList::from_config(&AppConfig::default()).unwrap();
        assert_eq!(source.url().as_str(), "https://filters.adtidy.org/extension/chromium/filters/2.txt");
    }
}
