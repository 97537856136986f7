//! Unified error types for cosmetic-filter.

use tokio_rusqlite::rusqlite;

/// Unified error types for the filter pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty filter URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Response body could not be decoded as text.
    #[error("NON_TEXT_BODY: {0}")]
    NonTextBody(String),

    /// Database operation failed.
    #[error("STORAGE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// The database was written by a newer schema version.
    #[error("STORAGE_ERROR: schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i64, supported: i64 },

    /// A stored cache value could not be decoded.
    #[error("CORRUPT_CACHE: {key}: {reason}")]
    CorruptCache { key: String, reason: String },

    /// A selector string was rejected by the CSS parser.
    #[error("INVALID_SELECTOR: {selector}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A DOM operation referenced a node that does not exist.
    #[error("DOM_ERROR: {0}")]
    Dom(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl Error {
    /// Whether the error came from a network fetch rather than local state.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_)
                | Error::HttpError(_)
                | Error::FetchTimeout(_)
                | Error::FetchTooLarge(_)
                | Error::NonTextBody(_)
        )
    }
}
