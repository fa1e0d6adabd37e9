//! Escalating recovery for pages whose formatted digest came out too short.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;

use crate::extractor::content::strip_elements;
use crate::extractor::fields::{DESCRIPTION_CHAIN, Lookup, first_match};
use crate::extractor::text::{char_len, collapse_whitespace, document_text, text_of, truncate_chars};
use crate::extractor::{ExtractedFields, Extraction};
use crate::garble::scrub;

/// Below this many characters the meta-tag tier runs.
pub const TIER1_MIN_CHARS: usize = 100;
/// SPA pages get the meta-tag tier below this many characters.
pub const TIER1_SPA_MIN_CHARS: usize = 300;
/// Below this many characters the render and heuristic tiers run.
pub const LATE_TIER_MIN_CHARS: usize = 150;

const MIN_BLOCK_CHARS: usize = 50;
const MAX_BLOCKS: usize = 10;
const MAX_AVAILABLE_CONTENT_CHARS: usize = 1000;
const MIN_VISIBLE_TEXT_CHARS: usize = 20;
const MAX_LD_DESCRIPTION_CHARS: usize = 500;
const MAX_BODY_TEXT_CHARS: usize = 1500;
const MIN_RENDERED_BODY_CHARS: usize = 100;

const NO_CONTENT_NOTE: &str =
    "Unable to extract detailed content. This may be a dynamically-loaded website.";

static META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static TEXT_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, section, article, p, span").unwrap());
static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

pub fn needs_tier1(digest: &str, is_spa: bool) -> bool {
    let len = char_len(digest);
    len < TIER1_MIN_CHARS || (is_spa && len < TIER1_SPA_MIN_CHARS)
}

pub fn needs_late_tier(digest: &str) -> bool {
    char_len(digest) < LATE_TIER_MIN_CHARS
}

/// Tier 1: rebuild from raw meta tags, any sizeable text blocks, and the
/// first JSON-LD object.
pub fn meta_fallback(extraction: &Extraction) -> String {
    let title = &extraction.fields.title;
    let mut parts = vec![format!("🌐 Website: {title}")];

    if extraction.fields.is_spa {
        parts.push("\n⚡ Note: This appears to be a modern web app (React/Vue/Angular)".to_string());
    }

    let meta = collect_meta(&extraction.document);
    let description = ["description", "og:description"]
        .iter()
        .find_map(|key| meta.get(*key).filter(|value| !value.is_empty()));
    if let Some(description) = description {
        parts.push(format!("\n📝 Description:\n{description}"));
    }
    if let Some(keywords) = meta.get("keywords") {
        parts.push(format!("\n🏷️ Keywords: {keywords}"));
    }
    if let Some(site_name) = meta.get("og:site_name") {
        parts.push(format!("\n🏢 Site: {site_name}"));
    }

    if let Some(body) = extraction.stripped.select(&BODY).next()
        && let Some(text) = available_content(body)
    {
        parts.push(format!("\n📄 Available Content:\n{text}"));
    }

    if let Some(info) = first_structured_data(&extraction.document) {
        if let Some(description) = info.description {
            parts.push(format!(
                "\n📋 Additional Info:\n{}",
                truncate_chars(&description, MAX_LD_DESCRIPTION_CHARS)
            ));
        }
        if let Some(kind) = info.kind {
            parts.push(format!("\n🔖 Type: {kind}"));
        }
    }

    let result = scrub(&parts.join("\n"));
    if char_len(&result) >= TIER1_MIN_CHARS {
        return result;
    }

    let body_text = truncate_chars(
        &collapse_whitespace(&document_text(&extraction.stripped, " ")),
        MAX_BODY_TEXT_CHARS,
    );
    let body_text = if body_text.is_empty() {
        NO_CONTENT_NOTE
    } else {
        body_text.as_str()
    };
    scrub(&format!("🌐 Website: {title}\n\n📄 Content:\n{body_text}"))
}

/// Every `name`/`property` meta tag with non-empty content. Later tags
/// overwrite earlier ones with the same key.
fn collect_meta(document: &Html) -> HashMap<String, String> {
    let mut meta = HashMap::new();
    for element in document.select(&META) {
        let attrs = element.value();
        let Some(content) = attrs.attr("content").filter(|c| !c.is_empty()) else {
            continue;
        };
        let key = attrs
            .attr("name")
            .filter(|name| !name.is_empty())
            .or_else(|| attrs.attr("property").filter(|p| !p.is_empty()));
        if let Some(key) = key {
            meta.insert(key.to_string(), content.to_string());
        }
    }
    meta
}

fn available_content(body: ElementRef<'_>) -> Option<String> {
    let blocks: Vec<String> = body
        .select(&TEXT_BLOCKS)
        .map(|element| text_of(element, ""))
        .filter(|text| char_len(text) > MIN_BLOCK_CHARS && !text.starts_with("JavaScript"))
        .take(MAX_BLOCKS)
        .collect();

    if blocks.is_empty() {
        let visible = collapse_whitespace(&text_of(body, " "));
        return (char_len(&visible) > MIN_VISIBLE_TEXT_CHARS)
            .then(|| truncate_chars(&visible, MAX_AVAILABLE_CONTENT_CHARS));
    }

    let combined = truncate_chars(
        &collapse_whitespace(&blocks.join(" ")),
        MAX_AVAILABLE_CONTENT_CHARS,
    );
    (char_len(&combined) > MIN_BLOCK_CHARS).then_some(combined)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct StructuredData {
    description: Option<String>,
    kind: Option<String>,
}

/// The first JSON-LD object carrying a `description` or `@type`.
fn first_structured_data(document: &Html) -> Option<StructuredData> {
    document.select(&JSON_LD).find_map(|script| {
        let raw: String = script.text().collect();
        let Ok(Value::Object(object)) = serde_json::from_str::<Value>(raw.trim()) else {
            return None;
        };

        let description = object
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let kind = object.get("@type").and_then(type_label);

        (description.is_some() || kind.is_some()).then_some(StructuredData { description, kind })
    })
}

fn type_label(value: &Value) -> Option<String> {
    match value {
        Value::String(kind) if !kind.is_empty() => Some(kind.clone()),
        Value::Array(kinds) => {
            let kinds: Vec<&str> = kinds.iter().filter_map(Value::as_str).collect();
            (!kinds.is_empty()).then(|| kinds.join(", "))
        }
        _ => None,
    }
}

/// Tier 2: digest of JavaScript-rendered markup. `None` when the rendered
/// body still has 100 characters of text or fewer.
pub fn rendered_digest(html: &str, fallback_title: &str) -> Option<String> {
    let document = strip_elements(
        &Html::parse_document(html),
        &["script", "style", "noscript"],
    );

    let title = Lookup::Text("title")
        .resolve(&document)
        .unwrap_or_else(|| fallback_title.to_string());
    let description = first_match(&document, &DESCRIPTION_CHAIN[..2]);

    let body = document.select(&BODY).next()?;
    let body_text = truncate_chars(
        &collapse_whitespace(&text_of(body, " ")),
        MAX_BODY_TEXT_CHARS,
    );
    if char_len(&body_text) <= MIN_RENDERED_BODY_CHARS {
        return None;
    }

    let mut result = format!("🌐 Website: {title}\n⚡ Rendered with JavaScript support\n");
    if let Some(description) = description {
        result.push_str(&format!("\n📝 Description:\n{description}\n"));
    }
    result.push_str(&format!("\n📄 Content:\n{body_text}"));
    Some(scrub(&result))
}

/// Guess at what a site is about from its domain name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DomainCategory {
    ECommerce,
    BlogNews,
    Technology,
    Healthcare,
    FoodBeverage,
    Education,
}

/// Checked in order; the first category with a matching keyword wins.
const CATEGORY_KEYWORDS: [(DomainCategory, &[&str]); 6] = [
    (
        DomainCategory::ECommerce,
        &["shop", "store", "buy", "commerce", "cart"],
    ),
    (DomainCategory::BlogNews, &["blog", "news", "post", "article"]),
    (
        DomainCategory::Technology,
        &["app", "tech", "dev", "code", "software", "forge", "digital"],
    ),
    (
        DomainCategory::Healthcare,
        &["health", "medical", "doctor", "clinic"],
    ),
    (
        DomainCategory::FoodBeverage,
        &["food", "restaurant", "cafe", "recipe"],
    ),
    (
        DomainCategory::Education,
        &["edu", "learn", "course", "school", "university"],
    ),
];

impl DomainCategory {
    pub fn from_domain(domain: &str) -> Option<Self> {
        let domain = domain.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| domain.contains(keyword)))
            .map(|(category, _)| *category)
    }

    pub fn label(self) -> &'static str {
        match self {
            DomainCategory::ECommerce => "E-commerce/Shopping",
            DomainCategory::BlogNews => "Blog/News/Content",
            DomainCategory::Technology => "Technology/Software/Digital Services",
            DomainCategory::Healthcare => "Healthcare/Medical",
            DomainCategory::FoodBeverage => "Food & Beverage",
            DomainCategory::Education => "Education/Training",
        }
    }
}

/// Tier 3: what is known so far, a category guess from the domain, and a
/// request for the user to describe the brand by hand. Always succeeds.
pub fn heuristic_digest(fields: &ExtractedFields, domain: &str) -> String {
    let title = &fields.title;
    let mut result = format!("🌐 Website: {title}\n🔗 Domain: {domain}\n");

    if let Some(description) = &fields.description {
        result.push_str(&format!("\n📝 Description:\n{description}\n"));
    }
    if let Some(keywords) = &fields.keywords {
        result.push_str(&format!("\n🏷️ Keywords: {keywords}\n"));
    }

    result.push_str("\n⚠️ Note: This website uses JavaScript to load content dynamically. ");
    result.push_str("Static scraping returned limited information. ");

    if let Some(category) = DomainCategory::from_domain(domain) {
        let label = category.label();
        result.push_str(&format!("\n\n💡 Detected Category: {label}"));
        result.push_str("\n\n📝 Suggested Description:\n");
        result.push_str(&format!(
            "'{title}' is a {} platform/website available at {domain}. ",
            label.to_lowercase()
        ));
    }

    result.push_str("\n\n💬 Please provide more details:\n");
    result.push_str("In the text area below, you can manually describe:\n");
    result.push_str("• What products/services you offer\n");
    result.push_str("• Your target audience\n");
    result.push_str("• Your unique value proposition\n");
    result.push_str("• Your brand personality/tone\n");
    result.push_str(
        "\nExample: 'We are a modern web development agency specializing in building \
         custom web applications for startups. We focus on React, Node.js, and cloud solutions.'",
    );

    scrub(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{FetchOrigin, extract_html};

    #[test]
    fn test_tier_thresholds() {
        assert!(needs_tier1(&"x".repeat(99), false));
        assert!(!needs_tier1(&"x".repeat(100), false));
        assert!(needs_tier1(&"x".repeat(299), true));
        assert!(!needs_tier1(&"x".repeat(300), true));

        assert!(needs_late_tier(&"x".repeat(149)));
        assert!(!needs_late_tier(&"x".repeat(150)));
    }

    #[test]
    fn test_domain_categories() {
        assert_eq!(
            DomainCategory::from_domain("myshop.example"),
            Some(DomainCategory::ECommerce)
        );
        assert_eq!(
            DomainCategory::from_domain("dailynews.io"),
            Some(DomainCategory::BlogNews)
        );
        assert_eq!(
            DomainCategory::from_domain("ClinicFinder.org"),
            Some(DomainCategory::Healthcare)
        );
        // Earlier categories win: "shop" beats "app".
        assert_eq!(
            DomainCategory::from_domain("appshop.com"),
            Some(DomainCategory::ECommerce)
        );
        assert_eq!(DomainCategory::from_domain("example.com"), None);
        assert_eq!(DomainCategory::ECommerce.label(), "E-commerce/Shopping");
    }

    #[test]
    fn test_meta_fallback_for_spa_shell() {
        let html = r#"<html><head><title>Dashboard</title>
            <meta name="description" content="">
            <meta property="og:description" content="Hosted dashboards for product teams.">
            <meta name="keywords" content="dashboards, analytics">
            <meta property="og:site_name" content="Dash">
            <script type="application/ld+json">[1, 2]</script>
            <script type="application/ld+json">{"@type": ["Organization", "Brand"], "description": "Dash makes dashboards."}</script>
            </head><body><div id="root"><span>A dashboard builder for teams that need answers quickly and without fuss.</span></div>
            <script src="/react.js"></script></body></html>"#;
        let extraction = extract_html(html, FetchOrigin::Homepage, false);
        assert!(extraction.fields.is_spa);

        let result = meta_fallback(&extraction);
        assert!(result.starts_with("🌐 Website: Dashboard\n"));
        assert!(result.contains("⚡ Note: This appears to be a modern web app"));
        assert!(result.contains("📝 Description:\nHosted dashboards for product teams."));
        assert!(result.contains("🏷️ Keywords: dashboards, analytics"));
        assert!(result.contains("🏢 Site: Dash"));
        assert!(result.contains("📄 Available Content:\nA dashboard builder"));
        assert!(result.contains("📋 Additional Info:\nDash makes dashboards."));
        assert!(result.contains("🔖 Type: Organization, Brand"));
    }

    #[test]
    fn test_meta_fallback_replaces_itself_when_still_short() {
        let extraction = extract_html(
            "<html><head><title>Tiny</title></head><body><p>Hi there</p></body></html>",
            FetchOrigin::Homepage,
            false,
        );
        assert_eq!(
            meta_fallback(&extraction),
            "🌐 Website: Tiny\n\n📄 Content:\nTiny Hi there"
        );

        let empty = extract_html("", FetchOrigin::Homepage, false);
        assert_eq!(
            meta_fallback(&empty),
            format!("🌐 Website: Unknown Website\n\n📄 Content:\n{NO_CONTENT_NOTE}")
        );
    }

    #[test]
    fn test_text_blocks_skip_javascript_notices() {
        let html = format!(
            "<html><body><div><p>JavaScript is required to view this page, please enable it now.</p></div>\
             <p>{}</p></body></html>",
            "Real words about the product and the people who build it. "
        );
        let document = Html::parse_document(&html);
        let body = document.select(&BODY).next().unwrap();
        let text = available_content(body).unwrap();
        // The wrapping div starts with "JavaScript" too, so only the plain paragraph survives.
        assert_eq!(
            text,
            "Real words about the product and the people who build it."
        );
    }

    #[test]
    fn test_rendered_digest() {
        let body = "Rendered product copy that only appears after scripts run. ".repeat(3);
        let html = format!(
            r#"<html><head><title>Rendered App</title><meta property="og:description" content="Now with content."></head>
            <body><div>{body}</div><script>boot()</script></body></html>"#
        );

        let result = rendered_digest(&html, "Fallback").unwrap();
        assert!(result.starts_with(
            "🌐 Website: Rendered App\n⚡ Rendered with JavaScript support\n\n📝 Description:\nNow with content.\n"
        ));
        assert!(result.contains("📄 Content:\nRendered product copy"));
        assert!(!result.contains("boot()"));

        let bare = "<html><body><div>still empty</div></body></html>";
        assert_eq!(rendered_digest(bare, "Fallback"), None);
    }

    #[test]
    fn test_heuristic_digest_with_category() {
        let mut fields = ExtractedFields::untitled();
        fields.title = "Cart Co".into();
        fields.description = Some("Carts for everyone.".into());

        let result = heuristic_digest(&fields, "cartco.com");
        assert!(result.starts_with("🌐 Website: Cart Co\n🔗 Domain: cartco.com\n"));
        assert!(result.contains("📝 Description:\nCarts for everyone."));
        assert!(result.contains("uses JavaScript to load content dynamically"));
        assert!(result.contains("💡 Detected Category: E-commerce/Shopping"));
        assert!(result.contains(
            "'Cart Co' is a e-commerce/shopping platform/website available at cartco.com."
        ));
        assert!(result.contains("💬 Please provide more details:"));
        assert!(result.ends_with("cloud solutions.'"));
    }

    #[test]
    fn test_heuristic_digest_without_category() {
        let fields = ExtractedFields::untitled();
        let result = heuristic_digest(&fields, "example.com");
        assert!(!result.contains("Detected Category"));
        assert!(result.contains("🔗 Domain: example.com"));
        assert!(!needs_late_tier(&result));
    }

    #[test]
    fn test_every_tier_starts_with_symbol_heavy_title() {
        let title = "✦".repeat(40);
        let title_line = format!("🌐 Website: {title}\n");

        let mut fields = ExtractedFields::untitled();
        fields.title = title.clone();
        assert!(heuristic_digest(&fields, "example.com").starts_with(&title_line));

        let page = format!("<html><head><title>{title}</title></head><body></body></html>");
        let extraction = extract_html(&page, FetchOrigin::Homepage, false);
        assert!(meta_fallback(&extraction).starts_with(&title_line));

        let rendered = format!(
            "<html><head><title>{title}</title></head><body><p>{}</p></body></html>",
            "Rendered words about the product. ".repeat(5)
        );
        assert!(rendered_digest(&rendered, "Fallback").unwrap().starts_with(&title_line));
    }
}
