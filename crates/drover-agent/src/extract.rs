//! JSON extraction from the loop's final answer
//!
//! Models wrap their JSON in prose, so the extractor takes the greedy span
//! from the first `{` to the last `}` and parses that. Known limitation:
//! a stray unmatched brace in surrounding prose widens the span and breaks
//! the parse; this heuristic is kept deliberately rather than guessing at
//! a balanced-brace scan with different failure modes.

use drover_core::{DroverError, Result};
use serde_json::Value;

/// Pull the first-`{`-to-last-`}` span out of `text` and parse it.
///
/// Fails with [`DroverError::NoJsonObject`] when no such span exists and
/// [`DroverError::MalformedJson`] when the span is not valid JSON.
pub fn extract_json(text: &str) -> Result<Value> {
    let start = text.find('{').ok_or(DroverError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(DroverError::NoJsonObject)?;
    if end < start {
        return Err(DroverError::NoJsonObject);
    }

    serde_json::from_str(&text[start..=end])
        .map_err(|e| DroverError::MalformedJson(e.to_string()))
}
