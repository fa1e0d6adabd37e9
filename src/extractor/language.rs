use whatlang::detect;

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_LENGTH: usize = 50;

/// ISO 639-3 code of the text's language, when detection is confident.
pub fn detect_language(text: &str) -> Option<String> {
    if text.trim().len() < MIN_TEXT_LENGTH {
        return None;
    }

    detect(text)
        .filter(|info| info.confidence() >= MIN_CONFIDENCE)
        .map(|info| info.lang().code().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_english() {
        let text = "This is a test of the English language detection system. It should work well.";
        assert_eq!(detect_language(text).as_deref(), Some("eng"));
    }

    #[test]
    fn test_detect_german() {
        let text = "Dies ist ein Test des Spracherkennungssystems. Es sollte gut funktionieren und die Sprache erkennen.";
        assert_eq!(detect_language(text).as_deref(), Some("deu"));
    }

    #[test]
    fn test_short_text_returns_none() {
        assert_eq!(detect_language("Hello"), None);
    }
}
