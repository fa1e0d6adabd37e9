use scraper::{ElementRef, Html};

/// Text under these elements is never visible.
const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Visible text below `element`: every text node trimmed, empty ones
/// dropped, the rest joined with `separator`.
pub fn text_of(element: ElementRef<'_>, separator: &str) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(separator)
}

pub fn document_text(document: &Html, separator: &str) -> String {
    text_of(document.root_element(), separator)
}

/// Character count of the document's visible text, with text nodes
/// concatenated directly.
pub fn visible_text_len(document: &Html) -> usize {
    char_len(&document_text(document, ""))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_of_skips_scripts_and_styles() {
        let doc = Html::parse_document(
            "<html><head><title> T </title><style>p{}</style></head>\
             <body><p> one </p><script>var x = 1;</script><p>two</p></body></html>",
        );
        assert_eq!(document_text(&doc, ""), "Tonetwo");
        assert_eq!(document_text(&doc, " "), "T one two");
        assert_eq!(visible_text_len(&doc), 7);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(char_len("🌐 ok"), 4);
    }
}
