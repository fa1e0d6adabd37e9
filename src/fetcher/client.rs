use crate::config::Config;
use crate::fetcher::{decode::process_response, errors::FetchError, types::FetchResult};
use crate::garble::passes_sample_check;
use crate::normalize::NormalizedUrl;
use once_cell::sync::Lazy;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Probed in order when the landing page carries too little text.
pub const ABOUT_PATHS: [&str; 5] = ["/about", "/about-us", "/about.html", "/company", "/who-we-are"];

/// An about page must be larger than this to be used.
const ABOUT_MIN_BYTES: usize = 500;

pub const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Only advertise brotli when this build can decode it.
const ACCEPT_ENCODING: &str = if cfg!(feature = "brotli") {
    "gzip, deflate, br"
} else {
    "gzip, deflate"
};

static BROWSER_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let pairs: [(HeaderName, &'static str); 14] = [
        (header::USER_AGENT, USER_AGENT),
        (
            header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
        (header::ACCEPT_LANGUAGE, "en-US,en;q=0.9"),
        (header::ACCEPT_ENCODING, ACCEPT_ENCODING),
        (header::DNT, "1"),
        (header::UPGRADE_INSECURE_REQUESTS, "1"),
        (HeaderName::from_static("sec-fetch-dest"), "document"),
        (HeaderName::from_static("sec-fetch-mode"), "navigate"),
        (HeaderName::from_static("sec-fetch-site"), "none"),
        (HeaderName::from_static("sec-fetch-user"), "?1"),
        (header::CACHE_CONTROL, "max-age=0"),
        (
            HeaderName::from_static("sec-ch-ua"),
            r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#,
        ),
        (HeaderName::from_static("sec-ch-ua-mobile"), "?0"),
        (HeaderName::from_static("sec-ch-ua-platform"), r#""Windows""#),
    ];

    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers
});

/// The browser-like request headers sent with every fetch.
pub fn browser_headers() -> &'static HeaderMap {
    &BROWSER_HEADERS
}

/// HTTP retrieval with bounded retries and an https -> http downgrade.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    fetch_timeout: Duration,
    about_timeout: Duration,
    attempts: u32,
    retry_pause: Duration,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .default_headers(BROWSER_HEADERS.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            fetch_timeout: config.fetch_timeout(),
            about_timeout: config.about_timeout(),
            attempts: config.fetch_attempts().max(1),
            retry_pause: config.retry_pause(),
        })
    }

    /// Fetch the page, falling back to plain http once when an https URL
    /// fails at the TLS or connection level. If the fallback fails too, the
    /// original error is returned.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &NormalizedUrl) -> Result<FetchResult, FetchError> {
        match self.fetch_with_retries(url.url()).await {
            Ok(result) => Ok(result),
            Err(err) if url.is_https() && err.is_connection_level() => {
                let Some(http_url) = url.http_variant() else {
                    return Err(err);
                };
                warn!(error = %err, "https fetch failed, retrying over http");
                match self.fetch_with_retries(http_url.url()).await {
                    Ok(result) => Ok(result),
                    Err(fallback_err) => {
                        debug!(error = %fallback_err, "http fallback failed");
                        Err(err)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Try up to `attempts` times, stopping at the first body that is short
    /// or not garbled. When every attempt looks garbled the last one is
    /// returned anyway.
    async fn fetch_with_retries(&self, url: &Url) -> Result<FetchResult, FetchError> {
        let mut attempt = 1;
        loop {
            let result = self.fetch_once(url, self.fetch_timeout).await?;
            if attempt >= self.attempts || passes_sample_check(&result.decoded_text) {
                return Ok(result);
            }

            debug!(attempt, "response looks garbled, retrying");
            tokio::time::sleep(self.retry_pause).await;
            attempt += 1;
        }
    }

    async fn fetch_once(&self, url: &Url, timeout: Duration) -> Result<FetchResult, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::Http { status });
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let body_bytes = response
            .bytes()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Compressed or chunked bodies carry no usable length up front.
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        debug!(
            %final_url,
            %status,
            size = body_bytes.len(),
            "fetched"
        );

        Ok(process_response(
            url.clone(),
            final_url,
            status,
            headers,
            body_bytes,
        ))
    }

    /// Probe the usual "about" locations under `base`. The first 200
    /// response with a body over 500 bytes wins; every failure is skipped.
    #[instrument(skip_all, fields(base = %base))]
    pub async fn fetch_about_page(&self, base: &Url) -> Option<FetchResult> {
        for path in ABOUT_PATHS {
            let Ok(about_url) = base.join(path) else {
                continue;
            };

            match self.fetch_once(&about_url, self.about_timeout).await {
                Ok(result)
                    if result.status == StatusCode::OK
                        && result.raw_bytes.len() > ABOUT_MIN_BYTES =>
                {
                    debug!(url = %about_url, "using about page");
                    return Some(result);
                }
                Ok(result) => {
                    debug!(url = %about_url, status = %result.status, "about page too small");
                }
                Err(err) => {
                    debug!(url = %about_url, error = %err, "about page unavailable");
                }
            }
        }

        None
    }
}
