//! Decoding of raw model output.
//!
//! Models asked for bare JSON still sometimes wrap it in a markdown fence
//! (```` ```json ... ``` ````). [`parse`] strips at most one surrounding fence
//! and decodes what is left. It is pure: no I/O, no retries.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::{ChartStudioError, Result};

/// Characters of the raw payload kept in the log when decoding fails
const PREVIEW_CHARS: usize = 200;

static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").expect("fence pattern is valid")
});

/// Returns the body of a single surrounding fenced block, or the trimmed
/// input when there is none (or the fence is empty).
pub fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match FENCE.captures(trimmed).and_then(|caps| caps.get(2)) {
        Some(body) if !body.as_str().trim().is_empty() => body.as_str().trim(),
        _ => trimmed,
    }
}

/// Decode `raw` as `T` after fence stripping.
///
/// Any decode failure becomes [`ChartStudioError::Parse`]; the decoder's
/// report is logged and kept in the error's diagnostic, never in its message.
pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let candidate = strip_fence(raw);
    serde_json::from_str(candidate).map_err(|e| {
        let preview: String = candidate.chars().take(PREVIEW_CHARS).collect();
        tracing::warn!(
            error = %e,
            preview = %preview,
            "Failed to parse model response as JSON"
        );
        ChartStudioError::Parse {
            diagnostic: e.to_string(),
        }
    })
}
