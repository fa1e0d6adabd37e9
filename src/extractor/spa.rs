use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::Serialize;

use crate::extractor::text::visible_text_len;

/// Script markup mentioning any of these suggests client-side rendering.
pub const FRAMEWORK_MARKERS: [&str; 5] = ["react", "vue", "angular", "next.js", "nuxt"];

/// Pages with less visible text than this are treated as unrendered shells.
pub const SHELL_TEXT_THRESHOLD: usize = 200;

static SCRIPT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpaAssessment {
    pub is_spa: bool,
    /// First marker found in a `<script>` element, if any.
    pub framework: Option<&'static str>,
    pub visible_text_len: usize,
}

pub fn assess(document: &Html) -> SpaAssessment {
    let framework = document.select(&SCRIPT).find_map(|script| {
        let markup = script.html().to_lowercase();
        FRAMEWORK_MARKERS
            .iter()
            .copied()
            .find(|marker| markup.contains(marker))
    });
    let visible_text_len = visible_text_len(document);

    SpaAssessment {
        is_spa: framework.is_some() || visible_text_len < SHELL_TEXT_THRESHOLD,
        framework,
        visible_text_len,
    }
}
