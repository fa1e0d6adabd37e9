use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::extractor::text::{char_len, text_of};

/// One way of reading a value out of a page. Only the first element the
/// strategy targets is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Trimmed text of the first element with this tag name.
    Text(&'static str),
    /// `content` of the first `<meta name="...">`.
    MetaName(&'static str),
    /// `content` of the first `<meta property="...">`.
    MetaProperty(&'static str),
}

impl Lookup {
    pub fn resolve(self, document: &Html) -> Option<String> {
        let (selector, read_text) = match self {
            Lookup::Text(tag) => (Selector::parse(tag).ok()?, true),
            Lookup::MetaName(name) => {
                (Selector::parse(&format!(r#"meta[name="{name}"]"#)).ok()?, false)
            }
            Lookup::MetaProperty(property) => (
                Selector::parse(&format!(r#"meta[property="{property}"]"#)).ok()?,
                false,
            ),
        };

        let element = document.select(&selector).next()?;
        let value = if read_text {
            text_of(element, "")
        } else {
            element.value().attr("content")?.trim().to_string()
        };

        (!value.is_empty()).then_some(value)
    }
}

pub const TITLE_CHAIN: [Lookup; 3] = [
    Lookup::Text("title"),
    Lookup::MetaProperty("og:title"),
    Lookup::Text("h1"),
];

pub const DESCRIPTION_CHAIN: [Lookup; 3] = [
    Lookup::MetaName("description"),
    Lookup::MetaProperty("og:description"),
    Lookup::MetaName("twitter:description"),
];

pub const KEYWORDS: Lookup = Lookup::MetaName("keywords");
pub const OG_TYPE: Lookup = Lookup::MetaProperty("og:type");
pub const OG_SITE_NAME: Lookup = Lookup::MetaProperty("og:site_name");

/// Evaluate `chain` in order; the first non-empty value wins.
pub fn first_match(document: &Html, chain: &[Lookup]) -> Option<String> {
    chain.iter().find_map(|lookup| lookup.resolve(document))
}

const HEADING_TAGS: [&str; 3] = ["h1", "h2", "h3"];
const HEADINGS_PER_TAG: usize = 5;
const MAX_HEADINGS: usize = 5;
const MIN_HEADING_CHARS: usize = 3;

/// Headings grouped by tag (all `h1`, then `h2`, then `h3`), not in
/// document order.
pub fn headings(document: &Html) -> Vec<String> {
    let mut found = Vec::new();
    for tag in HEADING_TAGS {
        let Ok(selector) = Selector::parse(tag) else {
            continue;
        };
        for heading in document.select(&selector).take(HEADINGS_PER_TAG) {
            let text = text_of(heading, "");
            if char_len(&text) > MIN_HEADING_CHARS {
                found.push(text);
            }
        }
    }
    found.truncate(MAX_HEADINGS);
    found
}

const ABOUT_KEYWORDS: [&str; 5] = ["about", "company", "who we are", "our story", "mission"];
const ABOUT_SCAN_LIMIT: usize = 50;
const ABOUT_MAX_PARAGRAPHS: usize = 3;

static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

/// Paragraphs that talk about the organisation behind the site.
pub fn about_text(document: &Html) -> Option<String> {
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH)
        .take(ABOUT_SCAN_LIMIT)
        .map(|p| text_of(p, ""))
        .filter(|text| {
            let lower = text.to_lowercase();
            ABOUT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        })
        .take(ABOUT_MAX_PARAGRAPHS)
        .collect();

    (!paragraphs.is_empty()).then(|| paragraphs.join(" "))
}
