use std::fmt;

use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid URL format. Please provide a valid domain (e.g., example.com)")]
pub struct InvalidUrlError {
    pub input: String,
}

/// An absolute `http`/`https` URL with a non-empty host.
///
/// Keeps the repaired input string verbatim alongside the parsed form so
/// normalizing twice returns the same string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    raw: String,
    parsed: Url,
}

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.parsed
    }

    pub fn is_https(&self) -> bool {
        self.parsed.scheme() == "https"
    }

    /// The same URL with `https://` swapped for `http://`.
    pub fn http_variant(&self) -> Option<NormalizedUrl> {
        let rest = self.raw.strip_prefix("https://")?;
        normalize(&format!("http://{rest}")).ok()
    }

    /// Host (plus port, if any) with one leading `www.` removed.
    pub fn bare_domain(&self) -> String {
        let host = self.parsed.host_str().unwrap_or_default();
        let host = host.strip_prefix("www.").unwrap_or(host);
        match self.parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Repair a free-form URL: trim, drop a leading `www.`, default the scheme
/// to https, then require a host.
pub fn normalize(input: &str) -> Result<NormalizedUrl, InvalidUrlError> {
    let invalid = || InvalidUrlError {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("www.").unwrap_or(trimmed);

    let raw = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&raw).map_err(|_| invalid())?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(NormalizedUrl { raw, parsed }),
        _ => Err(invalid()),
    }
}
