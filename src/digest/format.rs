use crate::extractor::ExtractedFields;
use crate::extractor::text::truncate_chars;
use crate::garble::scrub;

pub const MAX_ABOUT_CHARS: usize = 500;
pub const MAX_CONTENT_SECTION_CHARS: usize = 1000;

/// Render extracted fields as the digest, sections in fixed order, then
/// scrub decoding debris.
pub fn format_digest(fields: &ExtractedFields) -> String {
    let mut parts = vec![format!("🌐 Website: {}", fields.title)];

    if let Some(site_name) = &fields.site_name {
        parts.push(format!("🏢 Company: {site_name}"));
    }
    if let Some(description) = &fields.description {
        parts.push(format!("\n📝 Description:\n{description}"));
    }
    if let Some(kind) = &fields.kind {
        parts.push(format!("\n🔖 Type: {kind}"));
    }
    if let Some(keywords) = &fields.keywords {
        parts.push(format!("\n🏷️ Keywords: {keywords}"));
    }
    if !fields.headings.is_empty() {
        parts.push(format!(
            "\n📑 Key Topics:\n• {}",
            fields.headings.join("\n• ")
        ));
    }
    if let Some(about) = &fields.about {
        parts.push(format!(
            "\n💼 About:\n{}",
            truncate_chars(about, MAX_ABOUT_CHARS)
        ));
    }
    if let Some(content) = &fields.content {
        parts.push(format!(
            "\n📄 Main Content:\n{}",
            truncate_chars(content, MAX_CONTENT_SECTION_CHARS)
        ));
    }

    scrub(&parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_only() {
        let fields = ExtractedFields::untitled();
        assert_eq!(format_digest(&fields), "🌐 Website: Unknown Website");
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let mut fields = ExtractedFields::untitled();
        fields.title = "Acme Corp".into();
        fields.site_name = Some("Acme".into());
        fields.description = Some("Anvils and rockets.".into());
        fields.kind = Some("website".into());
        fields.keywords = Some("anvils, rockets".into());
        fields.headings = vec!["Welcome".into(), "Products".into()];
        fields.about = Some("About Acme.".into());
        fields.content = Some("Main body text.".into());

        let expected = "🌐 Website: Acme Corp\n\
                        🏢 Company: Acme\n\
                        \n📝 Description:\nAnvils and rockets.\n\
                        \n🔖 Type: website\n\
                        \n🏷️ Keywords: anvils, rockets\n\
                        \n📑 Key Topics:\n• Welcome\n• Products\n\
                        \n💼 About:\nAbout Acme.\n\
                        \n📄 Main Content:\nMain body text.";
        assert_eq!(format_digest(&fields), expected);
    }

    #[test]
    fn test_sections_are_capped() {
        let mut fields = ExtractedFields::untitled();
        fields.about = Some("a".repeat(800));
        fields.content = Some("c".repeat(2000));

        let digest = format_digest(&fields);
        assert!(digest.contains(&format!("💼 About:\n{}\n", "a".repeat(500))));
        assert!(digest.ends_with(&format!("📄 Main Content:\n{}", "c".repeat(1000))));
    }

    #[test]
    fn test_garbage_is_scrubbed() {
        let mut fields = ExtractedFields::untitled();
        fields.title = "Clean\u{FFFD} Title".into();
        fields.description = Some("§¶•ª º–≠‹›ﬁﬂ‡°·‚—±".into());

        let digest = format_digest(&fields);
        assert!(digest.starts_with("🌐 Website: Clean Title"));
        assert!(!digest.contains('\u{FFFD}'));
        assert!(!digest.contains("§¶"));
    }

    #[test]
    fn test_symbol_title_line_survives_scrub() {
        let mut fields = ExtractedFields::untitled();
        fields.title = "✦".repeat(40);

        let digest = format_digest(&fields);
        assert_eq!(digest, format!("🌐 Website: {}", "✦".repeat(40)));
    }
}
