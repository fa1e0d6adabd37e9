use std::fs;

use crate::extractor::{FetchOrigin, UNKNOWN_TITLE, extract_html};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

#[test]
fn test_extract_static_company_page() {
    let extraction = extract_html(&fixture("acme.html"), FetchOrigin::Homepage, false);
    let fields = extraction.fields;

    assert_eq!(fields.title, "Acme Corp");
    assert_eq!(fields.site_name.as_deref(), Some("Acme"));
    assert_eq!(fields.kind.as_deref(), Some("website"));
    assert_eq!(fields.keywords.as_deref(), Some("anvils, rockets, roller skates"));
    assert!(
        fields
            .description
            .as_deref()
            .unwrap()
            .starts_with("Acme builds dependable anvils")
    );
    assert!(!fields.is_spa);
    assert_eq!(fields.fetched_from, FetchOrigin::Homepage);

    // The <header> h1 is stripped before headings are collected.
    assert_eq!(
        fields.headings,
        vec![
            "Welcome to Acme",
            "Our Products",
            "Why customers choose us",
            "Shipping"
        ]
    );

    let about = fields.about.unwrap();
    assert!(about.starts_with("About the company"));
    assert!(!about.contains("Footer"));

    let content = fields.content.unwrap();
    assert!(content.starts_with("Acme has supplied dependable equipment"));
    assert!(content.contains("Orders placed before noon"));
    assert!(!content.contains("Sidebar promotion"));
    assert!(!content.contains("analytics"));
    assert!(content.chars().count() <= 2000);
}

#[test]
fn test_extract_keeps_parsed_document_untouched() {
    let extraction = extract_html(&fixture("acme.html"), FetchOrigin::Homepage, false);

    assert!(extraction.document.html().contains("<footer>"));
    assert!(!extraction.stripped.html().contains("<footer>"));
}

#[test]
fn test_extract_blog_post_by_content_class() {
    let extraction = extract_html(&fixture("blog.html"), FetchOrigin::AboutPage, false);
    let fields = extraction.fields;

    assert_eq!(fields.title, "How to Build Better Software");
    assert_eq!(
        fields.description.as_deref(),
        Some("Notes on building software that lasts.")
    );
    assert_eq!(fields.headings, vec!["Key Principles"]);
    assert_eq!(fields.fetched_from, FetchOrigin::AboutPage);

    let content = fields.content.unwrap();
    assert!(content.starts_with("Building better software"));
    assert!(!content.contains("Great post"));
}

#[test]
fn test_extract_spa_shell() {
    let extraction = extract_html(&fixture("spa_shell.html"), FetchOrigin::Homepage, false);
    let fields = extraction.fields;

    assert!(fields.is_spa);
    assert_eq!(fields.title, "Dashboard");
    assert_eq!(
        fields.description.as_deref(),
        Some("The fastest way to ship dashboards.")
    );
    assert_eq!(fields.content, None);
    assert!(fields.headings.is_empty());
}

#[test]
fn test_missing_title_uses_placeholder() {
    let extraction = extract_html(
        "<html><head></head><body><p>no title anywhere</p></body></html>",
        FetchOrigin::Homepage,
        false,
    );
    assert_eq!(extraction.fields.title, UNKNOWN_TITLE);
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Broken</title><body><p>Unclosed tags<div>More content";
    let extraction = extract_html(html, FetchOrigin::Homepage, true);

    assert_eq!(extraction.fields.title, "Broken");
    assert!(extraction.fields.rendered_with_js);
    assert!(extraction.fields.is_spa);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use crate::garble::scrub;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let extraction = extract_html(&html, FetchOrigin::Homepage, false);
            prop_assert!(!extraction.fields.title.is_empty());
            prop_assert!(extraction.fields.headings.len() <= 5);
        }

        #[test]
        fn test_scrub_output_has_no_control_characters(text in ".*") {
            let cleaned = scrub(&text);
            prop_assert!(cleaned.chars().all(|c| c == '\n' || !c.is_control()));
            prop_assert!(!cleaned.contains('\u{FFFD}'));
        }
    }
}
