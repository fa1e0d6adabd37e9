use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::{StatusCode, header::HeaderMap};
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

use crate::fetcher::types::{Charset, FetchResult};

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

/// Tried in order when the resolved charset cannot decode the body.
const FALLBACK_LABELS: [&str; 4] = ["utf-8", "latin1", "cp1252", "iso-8859-1"];

const SNIFF_WINDOW: usize = 4096;

pub fn process_response(
    requested_url: Url,
    final_url: Url,
    status: StatusCode,
    headers: HeaderMap,
    raw_bytes: Bytes,
) -> FetchResult {
    let content_type = headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok());

    let declared_encoding = resolve_charset(content_type, &raw_bytes);
    let decoded_text = decode_body(&raw_bytes, &declared_encoding);

    FetchResult {
        requested_url,
        final_url,
        status,
        headers,
        raw_bytes,
        declared_encoding,
        decoded_text,
        fetched_at: Utc::now(),
    }
}

/// Charset from the `Content-Type` header when present, otherwise sniffed
/// from the body (meta tags first, then statistical detection).
pub fn resolve_charset(content_type: Option<&str>, body_bytes: &[u8]) -> Charset {
    if let Some(content_type) = content_type
        && let Some(captures) = CHARSET_REGEX.captures(content_type)
        && let Some(label) = captures.get(1)
    {
        return Charset::from_label(label.as_str());
    }

    sniff_charset(body_bytes)
}

fn sniff_charset(body_bytes: &[u8]) -> Charset {
    let search_bytes = &body_bytes[..body_bytes.len().min(SNIFF_WINDOW)];
    let search_str = String::from_utf8_lossy(search_bytes);

    for regex in [&*META_CHARSET_REGEX, &*META_HTTP_EQUIV_REGEX] {
        if let Some(captures) = regex.captures(&search_str)
            && let Some(label) = captures.get(1)
            && let Some(encoding) = Encoding::for_label(label.as_str().as_bytes())
        {
            return Charset::from_encoding(encoding);
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, false);
    Charset::from_encoding(detector.guess(None, true))
}

/// Decode with the resolved charset, substituting U+FFFD for malformed
/// sequences. Never fails: an unusable charset label goes through the
/// fallback chain instead.
pub fn decode_body(body_bytes: &[u8], charset: &Charset) -> String {
    match charset.encoding() {
        Some(encoding) => {
            let (decoded, _encoding, _had_errors) = encoding.decode(body_bytes);
            decoded.into_owned()
        }
        None => {
            warn!(?charset, "unknown charset label, using fallback decoders");
            decode_with_fallbacks(body_bytes)
        }
    }
}

pub fn decode_with_fallbacks(body_bytes: &[u8]) -> String {
    for label in FALLBACK_LABELS {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            continue;
        };
        if let Some(decoded) = encoding.decode_without_bom_handling_and_without_replacement(body_bytes)
        {
            return decoded.into_owned();
        }
    }

    // Last resort: drop whatever does not decode.
    String::from_utf8_lossy(body_bytes).replace('\u{FFFD}', "")
}
