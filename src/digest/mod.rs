//! The digest pipeline: fetch, recover, extract, format, and fall back.

pub mod format;
pub mod ladder;


use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::DigestError;
use crate::extractor::{self, ExtractedFields, FetchOrigin, SpaAssessment, language, spa};
use crate::extractor::text::char_len;
use crate::fetcher::{FetchError, Fetcher};
use crate::garble::GarbleAssessment;
use crate::normalize::{NormalizedUrl, normalize};
use crate::render::{NoRenderer, PageRenderer};

pub use format::format_digest;
pub use ladder::DomainCategory;

/// Landing pages with less visible text than this trigger the about-page probe.
const ABOUT_PROBE_THRESHOLD: usize = 500;
/// SPA pages with less visible text than this are sent to the renderer.
const SPA_RENDER_THRESHOLD: usize = 500;

/// States the pipeline passes through. Every request starts at `Raw`; the
/// last state reached names the step that produced the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Raw,
    GarbleRecovered,
    AboutPage,
    SpaRendered,
    Tier1,
    Tier2,
    Tier3,
}

/// The finished digest and how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct PageDigest {
    pub url: Url,
    /// The text handed to the downstream prompt. Never empty.
    pub text: String,
    pub stage: Stage,
    pub trail: Vec<Stage>,
    pub fields: ExtractedFields,
    pub garble: GarbleAssessment,
    pub spa: SpaAssessment,
    pub language: Option<String>,
    /// When the landing page was fetched.
    pub fetched_at: DateTime<Utc>,
}

/// Runs the whole pipeline for one URL at a time. Cheap to share: it only
/// holds the HTTP client and the render capability.
#[derive(Clone)]
pub struct Digester {
    fetcher: Fetcher,
    renderer: Arc<dyn PageRenderer>,
    render_timeout: Duration,
}

impl Digester {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
            renderer: Arc::new(NoRenderer),
            render_timeout: config.render_timeout(),
        })
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Produce a digest for `input`.
    ///
    /// Fails only for an unusable URL or a fetch that could not be
    /// recovered; thin, garbled or script-only pages always yield text.
    #[instrument(skip_all, fields(input = %input.trim()))]
    pub async fn digest(&self, input: &str) -> Result<PageDigest, DigestError> {
        let url = normalize(input)?;
        let fetched = self.fetcher.fetch(&url).await?;

        let mut trail = vec![Stage::Raw];
        let about_base = fetched.requested_url;
        let fetched_at = fetched.fetched_at;
        let original_len = char_len(&fetched.decoded_text);
        let mut html = fetched.decoded_text;

        let mut garble = GarbleAssessment::of(&html);
        if garble.is_garbled {
            warn!(
                garbled = garble.garbled_char_count,
                total = garble.total_length,
                "page text looks garbled"
            );
            if let Some(rendered) = self.render(&url).await {
                let rendered_garble = GarbleAssessment::of(&rendered);
                if rendered_garble.garbled_char_count < garble.garbled_char_count {
                    html = rendered;
                    garble = rendered_garble.cleared();
                    enter(&mut trail, Stage::GarbleRecovered);
                }
            }
        }

        let mut fetched_from = FetchOrigin::Homepage;
        if assess_spa(&html).visible_text_len < ABOUT_PROBE_THRESHOLD
            && let Some(about) = self.fetcher.fetch_about_page(&about_base).await
        {
            html = about.decoded_text;
            fetched_from = FetchOrigin::AboutPage;
            enter(&mut trail, Stage::AboutPage);
        }

        let spa = assess_spa(&html);
        let mut rendered_with_js = false;
        if spa.is_spa && spa.visible_text_len < SPA_RENDER_THRESHOLD {
            debug!(framework = ?spa.framework, visible = spa.visible_text_len, "single-page app suspected");
            if let Some(rendered) = self.render(&url).await
                && char_len(&rendered) > original_len
            {
                html = rendered;
                rendered_with_js = true;
                enter(&mut trail, Stage::SpaRendered);
            }
        }

        let StaticOutcome {
            fields,
            mut text,
            used_meta_fallback,
        } = static_stage(&html, fetched_from, rendered_with_js, spa.is_spa);
        if used_meta_fallback {
            enter(&mut trail, Stage::Tier1);
        }

        if ladder::needs_late_tier(&text) {
            if !fields.rendered_with_js
                && let Some(rendered) = self.render(&url).await
                && let Some(rendered_text) = ladder::rendered_digest(&rendered, &fields.title)
            {
                text = rendered_text;
                enter(&mut trail, Stage::Tier2);
            }

            if ladder::needs_late_tier(&text) {
                text = ladder::heuristic_digest(&fields, &url.bare_domain());
                enter(&mut trail, Stage::Tier3);
            }
        }

        let stage = trail.last().copied().unwrap_or(Stage::Raw);
        let language = [&fields.content, &fields.about, &fields.description]
            .into_iter()
            .flatten()
            .find_map(|prose| language::detect_language(prose));

        info!(?stage, chars = char_len(&text), "digest ready");

        Ok(PageDigest {
            url: url.url().clone(),
            text,
            stage,
            trail,
            fields,
            garble,
            spa,
            language,
            fetched_at,
        })
    }

    /// Call the renderer, bounded by the render timeout. Missing, failing
    /// and slow renderers all come back as `None`.
    async fn render(&self, url: &NormalizedUrl) -> Option<String> {
        if !self.renderer.is_available() {
            return None;
        }
        match tokio::time::timeout(self.render_timeout, self.renderer.render(url.url())).await {
            Ok(rendered) => rendered,
            Err(_) => {
                warn!(timeout = ?self.render_timeout, "renderer timed out");
                None
            }
        }
    }
}

fn enter(trail: &mut Vec<Stage>, stage: Stage) {
    debug!(?stage, "pipeline transition");
    trail.push(stage);
}

fn assess_spa(html: &str) -> SpaAssessment {
    spa::assess(&Html::parse_document(html))
}

struct StaticOutcome {
    fields: ExtractedFields,
    text: String,
    used_meta_fallback: bool,
}

/// Extraction, formatting and the meta-tag tier all work on parsed trees,
/// which stay inside this synchronous step.
///
/// `is_spa` is the detector's verdict on the page before any rendering; it
/// replaces the flag recomputed from rendered markup.
fn static_stage(
    html: &str,
    fetched_from: FetchOrigin,
    rendered_with_js: bool,
    is_spa: bool,
) -> StaticOutcome {
    let mut extraction = extractor::extract_html(html, fetched_from, rendered_with_js);
    extraction.fields.is_spa = is_spa;
    let text = format_digest(&extraction.fields);

    if ladder::needs_tier1(&text, extraction.fields.is_spa) {
        let text = ladder::meta_fallback(&extraction);
        return StaticOutcome {
            fields: extraction.fields,
            text,
            used_meta_fallback: true,
        };
    }

    StaticOutcome {
        fields: extraction.fields,
        text,
        used_meta_fallback: false,
    }
}
