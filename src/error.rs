//! Error taxonomy shared by the catalog, the metadata fetcher and the controller.

/// Everything that can go wrong while managing the watchlist.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad user input (empty title, unparsable year, rating out of range).
    #[error("{0}")]
    Validation(String),

    /// The catalog file could not be read, parsed or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The metadata lookup failed in transport (timeout, refused, bad status).
    #[error("Network error: {0}")]
    Network(String),

    /// The metadata provider has no match for the title.
    #[error("Movie not found: {0}")]
    NotFound(String),

    /// Missing or rejected configuration (no API key, invalid key).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A row reference that does not exist in the catalog.
    #[error("No movie at row {index} (catalog has {len})")]
    Index { index: usize, len: usize },
}

impl Error {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key as a query parameter.
        let err = err.without_url();
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_error_mentions_row_and_len() {
        let err = Error::Index { index: 4, len: 2 };
        assert_eq!(err.to_string(), "No movie at row 4 (catalog has 2)");
    }

    #[test]
    fn io_errors_become_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(Error::from(io), Error::Storage(_)));
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = Error::validation("Year must be a number.");
        assert_eq!(err.to_string(), "Year must be a number.");
    }
}
