// src/fetch/charset.rs
// =============================================================================
// Turns a raw response body into UTF-8 text for the HTML parser.
//
// Steps:
// 1. Look for `charset=...` in the Content-Type header
// 2. If there is none, guess the encoding from the bytes themselves
// 3. UTF-8 passes through as-is; anything else is transcoded
//
// Only an unknown charset label is an error. Bytes that don't fit the chosen
// encoding are replaced with U+FFFD, which is good enough to find links.
// =============================================================================

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

pub fn normalize(body: &[u8], content_type: Option<&str>) -> Result<String, String> {
    let encoding = match content_type.and_then(declared_charset) {
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| format!("unknown charset '{label}'"))?,
        None => detect(body),
    };

    if encoding == UTF_8 {
        return Ok(String::from_utf8_lossy(body).into_owned());
    }

    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::trace!(encoding = encoding.name(), "malformed bytes replaced");
    }
    Ok(text.into_owned())
}

fn detect(body: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(body, true);
    detector.guess(None, true)
}

// "text/html; charset=\"ISO-8859-1\"" -> Some("ISO-8859-1")
fn declared_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches('"').trim();
            (!value.is_empty()).then_some(value)
        } else {
            None
        }
    })
}
