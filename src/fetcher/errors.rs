use std::error::Error as _;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("tls error: {0}")]
    Tls(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("too many redirects")]
    RedirectLoop,

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("io error: {0}")]
    Io(String),

    #[error("client setup failed: {0}")]
    Client(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    /// TLS and connection-level failures; an https URL that fails this way
    /// is retried once over plain http.
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            Self::Tls(_) | Self::Connection(_) | Self::ConnectTimeout
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout | Self::RequestTimeout)
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_connect() || err.is_request() {
            if mentions_tls(&err) {
                Self::Tls(err.to_string())
            } else {
                Self::Connection(err.to_string())
            }
        } else if err.is_body() || err.is_decode() {
            Self::Io(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

/// reqwest does not classify TLS failures, so look for them in the source chain.
fn mentions_tls(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        let message = inner.to_string().to_ascii_lowercase();
        if ["certificate", "tls", "ssl", "handshake"]
            .iter()
            .any(|needle| message.contains(needle))
        {
            return true;
        }
        source = inner.source();
    }
    false
}
