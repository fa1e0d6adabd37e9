use reqwest::StatusCode;
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::normalize::InvalidUrlError;

/// The only failures a digest request can surface. Everything else is
/// recovered inside the pipeline.
#[derive(Error, Debug)]
pub enum DigestError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrlError),

    #[error("{}", network_message(.0))]
    Network(#[from] FetchError),
}

impl DigestError {
    /// HTTP status behind the failure, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DigestError::Network(FetchError::Http { status }) => Some(*status),
            _ => None,
        }
    }
}

fn network_message(err: &FetchError) -> String {
    match err {
        err if err.is_timeout() => {
            "Website took too long to respond. Please try again.".to_string()
        }
        FetchError::Tls(_) => "SSL certificate error. The website may not be secure.".to_string(),
        FetchError::Connection(_) => {
            "Could not connect to website. Please check the URL.".to_string()
        }
        FetchError::Http { status } => match status.as_u16() {
            403 => "Access denied (403). This website blocks automated scraping. Please manually describe your brand instead.".to_string(),
            404 => "Page not found (404). Please check the URL.".to_string(),
            code => format!(
                "HTTP Error {code}: {}",
                status.canonical_reason().unwrap_or("unexpected status")
            ),
        },
        other => format!("Failed to fetch website: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_http_status_messages() {
        let forbidden = DigestError::from(FetchError::Http {
            status: StatusCode::FORBIDDEN,
        });
        assert!(forbidden.to_string().starts_with("Access denied (403)"));
        assert!(forbidden.to_string().contains("manually describe your brand"));
        assert_eq!(forbidden.status(), Some(StatusCode::FORBIDDEN));

        let missing = DigestError::from(FetchError::Http {
            status: StatusCode::NOT_FOUND,
        });
        assert_eq!(
            missing.to_string(),
            "Page not found (404). Please check the URL."
        );

        let unavailable = DigestError::from(FetchError::Http {
            status: StatusCode::SERVICE_UNAVAILABLE,
        });
        assert_eq!(
            unavailable.to_string(),
            "HTTP Error 503: Service Unavailable"
        );
    }

    #[test]
    fn test_transport_messages() {
        for timeout in [FetchError::ConnectTimeout, FetchError::RequestTimeout] {
            assert!(DigestError::from(timeout).to_string().contains("took too long"));
        }
        assert!(
            DigestError::from(FetchError::Tls("bad cert".into()))
                .to_string()
                .starts_with("SSL certificate error")
        );
        assert!(
            DigestError::from(FetchError::Connection("refused".into()))
                .to_string()
                .starts_with("Could not connect")
        );
        assert_eq!(
            DigestError::from(FetchError::RedirectLoop).to_string(),
            "Failed to fetch website: too many redirects"
        );
        assert_eq!(
            DigestError::from(FetchError::BodyTooLarge(6_000_000)).to_string(),
            "Failed to fetch website: body too large (6000000 bytes)"
        );
    }

    #[test]
    fn test_invalid_url_message() {
        let err = DigestError::from(normalize("").unwrap_err());
        assert!(err.to_string().starts_with("Invalid URL format"));
        assert_eq!(err.status(), None);
    }
}
