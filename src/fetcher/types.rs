use bytes::Bytes;
use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use reqwest::{StatusCode, header::HeaderMap};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    Utf8,
    Windows1252,
    ShiftJis,
    Gb18030,
    Big5,
    /// Any other label, kept verbatim. May not name a known encoding.
    Other(String),
}

impl Charset {
    pub fn from_encoding(encoding: &'static Encoding) -> Self {
        use std::ptr;

        if ptr::eq(encoding, encoding_rs::UTF_8) {
            Self::Utf8
        } else if ptr::eq(encoding, encoding_rs::WINDOWS_1252) {
            Self::Windows1252
        } else if ptr::eq(encoding, encoding_rs::SHIFT_JIS) {
            Self::ShiftJis
        } else if ptr::eq(encoding, encoding_rs::GBK) || ptr::eq(encoding, encoding_rs::GB18030) {
            Self::Gb18030
        } else if ptr::eq(encoding, encoding_rs::BIG5) {
            Self::Big5
        } else {
            Self::Other(encoding.name().to_string())
        }
    }

    /// Resolve a label as found in a header or meta tag. Unknown labels are
    /// preserved so decoding can report them.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => Self::from_encoding(encoding),
            None => Self::Other(label),
        }
    }

    pub fn encoding(&self) -> Option<&'static Encoding> {
        match self {
            Self::Utf8 => Some(encoding_rs::UTF_8),
            Self::Windows1252 => Some(encoding_rs::WINDOWS_1252),
            Self::ShiftJis => Some(encoding_rs::SHIFT_JIS),
            Self::Gb18030 => Some(encoding_rs::GB18030),
            Self::Big5 => Some(encoding_rs::BIG5),
            Self::Other(label) => Encoding::for_label(label.as_bytes()),
        }
    }
}

/// One successful HTTP retrieval, decoded to text.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The URL that was requested (after any protocol downgrade).
    pub requested_url: Url,
    pub final_url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw_bytes: Bytes,
    pub declared_encoding: Charset,
    pub decoded_text: String,
    pub fetched_at: DateTime<Utc>,
}
