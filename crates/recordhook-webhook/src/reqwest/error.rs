//! Errors raised by the reqwest client.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP exchange failed before a status line arrived.
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Client settings were rejected.
    #[error("invalid HTTP client settings: {0}")]
    Config(String),
}

impl Error {
    fn message(err: &reqwest::Error) -> &'static str {
        if err.is_timeout() {
            "endpoint did not answer in time"
        } else if err.is_connect() {
            "cannot connect to endpoint"
        } else if err.is_builder() {
            "request could not be built"
        } else {
            "request failed"
        }
    }
}

impl From<Error> for crate::Error {
    fn from(err: Error) -> Self {
        let err = match err {
            Error::Http(err) => err,
            Error::Config(message) => return Self::configuration().with_message(message),
        };

        let error = if err.is_timeout() {
            Self::timeout()
        } else {
            Self::network_error()
        };

        error.with_message(Error::message(&err)).with_source(err)
    }
}
