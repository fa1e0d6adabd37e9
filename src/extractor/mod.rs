pub mod content;
pub mod fields;
pub mod language;
pub mod model;
pub mod spa;
pub mod text;

#[cfg(test)]
mod tests;

pub use model::{ExtractedFields, FetchOrigin, UNKNOWN_TITLE};
pub use spa::SpaAssessment;

use scraper::Html;

/// Fields read from a page plus the two trees they came from.
pub struct Extraction {
    pub fields: ExtractedFields,
    /// The page as parsed.
    pub document: Html,
    /// The page with boilerplate elements detached.
    pub stripped: Html,
}

/// Run every field lookup over `document`.
///
/// Title and meta fields come from the parsed page; headings, about text and
/// main content from a stripped copy.
pub fn extract(document: Html, fetched_from: FetchOrigin, rendered_with_js: bool) -> Extraction {
    let spa = spa::assess(&document);

    let title = fields::first_match(&document, &fields::TITLE_CHAIN)
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let description = fields::first_match(&document, &fields::DESCRIPTION_CHAIN);
    let keywords = fields::KEYWORDS.resolve(&document);
    let kind = fields::OG_TYPE.resolve(&document);
    let site_name = fields::OG_SITE_NAME.resolve(&document);

    let stripped = content::strip_elements(&document, &content::BOILERPLATE_TAGS);
    let content = content::main_content(&stripped);
    let headings = fields::headings(&stripped);
    let about = fields::about_text(&stripped);

    Extraction {
        fields: ExtractedFields {
            title,
            description,
            keywords,
            kind,
            site_name,
            headings,
            about,
            content,
            is_spa: spa.is_spa,
            fetched_from,
            rendered_with_js,
        },
        document,
        stripped,
    }
}

/// Parse and extract in one step.
pub fn extract_html(html: &str, fetched_from: FetchOrigin, rendered_with_js: bool) -> Extraction {
    extract(Html::parse_document(html), fetched_from, rendered_with_js)
}
