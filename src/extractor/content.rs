use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::extractor::text::{char_len, collapse_whitespace, text_of, truncate_chars};

/// Boilerplate removed before looking for the main content.
pub const BOILERPLATE_TAGS: [&str; 10] = [
    "script", "style", "nav", "footer", "header", "aside", "iframe", "noscript", "form", "button",
];

const MIN_PARAGRAPH_TEXT: usize = 100;
const MAX_FALLBACK_ITEMS: usize = 20;
const MIN_CONTENT_CHARS: usize = 50;
pub const MAX_CONTENT_CHARS: usize = 2000;

static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static LIST_OR_DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li, div").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// A copy of `document` with every element named in `tags` detached.
/// The input is left untouched.
pub fn strip_elements(document: &Html, tags: &[&str]) -> Html {
    let mut working = document.clone();
    let Ok(selector) = Selector::parse(&tags.join(", ")) else {
        return working;
    };

    let ids: Vec<_> = working.select(&selector).map(|element| element.id()).collect();
    for id in ids {
        if let Some(mut node) = working.tree.get_mut(id) {
            node.detach();
        }
    }
    working
}

/// One step of the content-root search.
#[derive(Debug, Clone, Copy)]
pub enum RootLookup {
    /// First element with this tag.
    Tag(&'static str),
    /// First `tag` whose `attr` contains a needle (case-insensitive). Needles
    /// are tried in order, each over the whole document.
    AttrContains {
        tag: &'static str,
        attr: &'static str,
        needles: &'static [&'static str],
    },
}

impl RootLookup {
    pub fn resolve(self, document: &Html) -> Option<ElementRef<'_>> {
        match self {
            RootLookup::Tag(tag) => {
                let selector = Selector::parse(tag).ok()?;
                document.select(&selector).next()
            }
            RootLookup::AttrContains { tag, attr, needles } => {
                let selector = Selector::parse(tag).ok()?;
                needles.iter().find_map(|needle| {
                    document.select(&selector).find(|element| {
                        element
                            .value()
                            .attr(attr)
                            .is_some_and(|value| value.to_lowercase().contains(needle))
                    })
                })
            }
        }
    }
}

pub const CONTENT_ROOT_CHAIN: [RootLookup; 5] = [
    RootLookup::Tag("main"),
    RootLookup::Tag("article"),
    RootLookup::AttrContains {
        tag: "div",
        attr: "class",
        needles: &[
            "content",
            "main-content",
            "post-content",
            "entry-content",
            "article-content",
        ],
    },
    RootLookup::AttrContains {
        tag: "div",
        attr: "id",
        needles: &["content", "main-content", "main", "primary"],
    },
    RootLookup::AttrContains {
        tag: "section",
        attr: "class",
        needles: &["content", "main"],
    },
];

/// The element most likely to hold the page's prose, `<body>` as a last resort.
pub fn content_root(document: &Html) -> Option<ElementRef<'_>> {
    CONTENT_ROOT_CHAIN
        .iter()
        .find_map(|lookup| lookup.resolve(document))
        .or_else(|| document.select(&BODY).next())
}

/// Main text of an already stripped document, capped at
/// [`MAX_CONTENT_CHARS`]. `None` when 50 characters or fewer remain.
pub fn main_content(document: &Html) -> Option<String> {
    let root = content_root(document)?;

    let mut text = root
        .select(&PARAGRAPH)
        .map(|p| text_of(p, ""))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if char_len(&text) < MIN_PARAGRAPH_TEXT {
        let items = root
            .select(&LIST_OR_DIV)
            .take(MAX_FALLBACK_ITEMS)
            .map(|item| text_of(item, ""))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        text.push(' ');
        text.push_str(&items);
    }

    if char_len(&text) < MIN_PARAGRAPH_TEXT {
        text = text_of(root, " ");
    }

    let text = collapse_whitespace(&text);
    (char_len(&text) > MIN_CONTENT_CHARS).then(|| truncate_chars(&text, MAX_CONTENT_CHARS))
}
