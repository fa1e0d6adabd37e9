#![no_main]

use libfuzzer_sys::fuzz_target;

use sitebrief::digest::format_digest;
use sitebrief::extractor::{FetchOrigin, extract_html};
use sitebrief::fetcher::decode::{decode_body, resolve_charset};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes go through the same decode path as a real response
    let charset = resolve_charset(None, data);
    let html = decode_body(data, &charset);

    // Extraction and formatting should never panic regardless of input
    let extraction = extract_html(&html, FetchOrigin::Homepage, false);
    let digest = format_digest(&extraction.fields);

    assert!(!digest.contains('\u{FFFD}'));
});
