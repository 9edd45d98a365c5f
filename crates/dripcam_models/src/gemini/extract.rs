//! Schema-tolerant response scanning.
//!
//! The provider has moved the image payload around between API revisions
//! (`inline_data` vs `inlineData`, extra wrapping), so the raw body is
//! scanned for the first `"data": "<base64>"` field instead of walking a
//! fixed path.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dripcam_error::{GenerationError, GenerationErrorKind};
use regex::Regex;
use std::sync::LazyLock;

static DATA_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""data"\s*:\s*"([^"]+)""#).expect("valid regex")
});

static TEXT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""text"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid regex")
});

/// Decode the first inline base64 payload in `body`.
///
/// Returns `Ok(None)` when the body carries no payload at all.
///
/// # Errors
///
/// `InvalidImageData` when a payload is present but is not valid base64.
pub fn extract_inline_image(body: &str) -> Result<Option<Vec<u8>>, GenerationError> {
    let Some(captures) = DATA_FIELD.captures(body) else {
        return Ok(None);
    };

    let encoded = captures[1].replace("\\/", "/");
    STANDARD
        .decode(encoded.as_bytes())
        .map(Some)
        .map_err(|e| GenerationError::new(GenerationErrorKind::InvalidImageData(e.to_string())))
}

/// Join every `"text"` field in `body`, unescaped, or `None` if there are none.
pub fn extract_declined_text(body: &str) -> Option<String> {
    let texts: Vec<String> = TEXT_FIELD
        .captures_iter(body)
        .filter_map(|c| serde_json::from_str::<String>(&format!("\"{}\"", &c[1])).ok())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join(" "))
    }
}
