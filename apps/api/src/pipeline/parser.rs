//! Best-effort recovery of a JSON object from free-form model output.
//!
//! Models wrap JSON in prose, apologies, and markdown fences no matter how
//! firmly the prompt forbids it. This module tolerates all of that and
//! reports failure as a plain `Err` — callers decide whether that means
//! falling back to a stage's default schema.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JsonExtractError {
    #[error("no JSON object found in text")]
    NoObject,

    #[error("candidate object failed to parse: {0}")]
    Malformed(String),
}

/// Extracts the first parsable JSON object from `text`.
///
/// Tolerates leading/trailing commentary and markdown code fences. Pure
/// function of its input; calling it twice yields the same result.
pub fn extract_json_object(text: &str) -> Result<Value, JsonExtractError> {
    let text = strip_code_fences(text);

    // Fast path: the whole text is the object.
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if value.is_object() {
            return Ok(value);
        }
    }

    // Slow path: scan for balanced `{ ... }` candidates embedded in prose.
    let bytes = text.as_bytes();
    let mut last_parse_error: Option<String> = None;
    let mut saw_candidate = false;

    for (start, _) in text.char_indices().filter(|&(_, c)| c == '{') {
        let Some(end) = find_matching_brace(bytes, start) else {
            continue;
        };
        saw_candidate = true;
        match serde_json::from_str::<Value>(&text[start..=end]) {
            Ok(value) if value.is_object() => return Ok(value),
            Ok(_) => {}
            Err(e) => last_parse_error = Some(e.to_string()),
        }
    }

    if saw_candidate {
        Err(JsonExtractError::Malformed(
            last_parse_error.unwrap_or_else(|| "not a JSON object".to_string()),
        ))
    } else {
        Err(JsonExtractError::NoObject)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the byte index of the `}` matching the `{` at `start`, honoring
/// string literals and escapes.
fn find_matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
