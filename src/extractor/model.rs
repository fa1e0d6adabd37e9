use serde::{Deserialize, Serialize};

/// Title used when a page offers no title, `og:title` or `<h1>`.
pub const UNKNOWN_TITLE: &str = "Unknown Website";

/// Which document the fields were read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOrigin {
    #[default]
    Homepage,
    AboutPage,
}

/// Structured signals pulled out of one parsed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Never empty; falls back to [`UNKNOWN_TITLE`].
    pub title: String,
    pub description: Option<String>,
    pub keywords: Option<String>,
    /// `og:type`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub site_name: Option<String>,
    /// At most five entries.
    pub headings: Vec<String>,
    pub about: Option<String>,
    /// Main prose, at most 2000 characters.
    pub content: Option<String>,
    pub is_spa: bool,
    pub fetched_from: FetchOrigin,
    pub rendered_with_js: bool,
}

impl ExtractedFields {
    pub fn untitled() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            description: None,
            keywords: None,
            kind: None,
            site_name: None,
            headings: Vec::new(),
            about: None,
            content: None,
            is_spa: false,
            fetched_from: FetchOrigin::Homepage,
            rendered_with_js: false,
        }
    }
}
