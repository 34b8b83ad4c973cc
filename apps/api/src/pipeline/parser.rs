//! Response parser: recovers structured JSON from model text.
//!
//! Order of attempts:
//! 1. strip a fenced code block (```json ... ``` or ``` ... ```) and decode strictly
//! 2. scan for the first balanced `{...}` / `[...]` span that decodes
//!
//! All heuristics live in `extract_json`, a pure function. Decoding into a typed
//! stage output is a second step so that "no JSON at all" and "JSON of the wrong
//! shape" both surface as `ParseError` carrying an excerpt of what the model said.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Maximum characters of raw model output carried in a `ParseError`.
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason} (model output began: {raw_excerpt:?})")]
pub struct ParseError {
    pub reason: String,
    pub raw_excerpt: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            raw_excerpt: excerpt(raw),
        }
    }
}

fn excerpt(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out: String = trimmed.chars().take(EXCERPT_CHARS).collect();
    if trimmed.chars().count() > EXCERPT_CHARS {
        out.push('…');
    }
    out
}

/// Extracts the first structured (object or array) JSON value from model output.
pub fn extract_json(raw: &str) -> Result<Value, ParseError> {
    let unwrapped = strip_code_fence(raw);
    if let Ok(value) = serde_json::from_str::<Value>(unwrapped) {
        if value.is_object() || value.is_array() {
            return Ok(value);
        }
    }

    first_balanced_value(raw)
        .ok_or_else(|| ParseError::new("no JSON object or array found in model output", raw))
}

/// Extracts JSON and decodes it into `T`.
pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let value = extract_json(raw)?;
    serde_json::from_value(value)
        .map_err(|e| ParseError::new(format!("model JSON did not match expected shape: {e}"), raw))
}

/// Returns the body of the first fenced code block, or the trimmed input when
/// there is no fence. An unterminated fence yields everything after it.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(start) = text.find("```") else {
        return text;
    };
    let after = &text[start + 3..];
    // Language tag, e.g. ```json
    let body = after.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn first_balanced_value(text: &str) -> Option<Value> {
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find(&['{', '['][..]) {
        let start = cursor + offset;
        match balanced_len(&text[start..]) {
            Some(len) => {
                if let Ok(value) = serde_json::from_str::<Value>(&text[start..start + len]) {
                    return Some(value);
                }
                cursor = start + len;
            }
            // A reply that opens with JSON and never closes it was cut off;
            // an inner fragment of it is not the answer.
            None if text[..start].trim().is_empty() => return None,
            // A stray bracket in prose.
            None => cursor = start + 1,
        }
    }
    None
}

/// Byte length of the bracketed span starting at `s[0]`, honouring string
/// literals and escapes. `None` if the span never closes.
fn balanced_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shape {
        title: String,
        score: f32,
    }

    #[test]
    fn test_plain_json_decodes() {
        let value = extract_json("{\"key\": \"value\"}").unwrap();
        assert_eq!(value, json!({"key": "value"}));
    }

    #[test]
    fn test_fenced_json_matches_unwrapped() {
        let bare = "{\"title\": \"SRE\", \"score\": 7.5, \"tags\": [\"a\", \"b\"]}";
        let fenced = format!("```json\n{bare}\n```");
        let untagged = format!("```\n{bare}\n```");
        let expected = extract_json(bare).unwrap();
        assert_eq!(extract_json(&fenced).unwrap(), expected);
        assert_eq!(extract_json(&untagged).unwrap(), expected);
    }

    #[test]
    fn test_fence_surrounded_by_prose() {
        let raw = "Sure! Here is the analysis:\n```json\n{\"title\": \"SRE\", \"score\": 8}\n```\nLet me know if you need more.";
        let shape: Shape = parse(raw).unwrap();
        assert_eq!(
            shape,
            Shape {
                title: "SRE".to_string(),
                score: 8.0
            }
        );
    }

    #[test]
    fn test_unterminated_fence() {
        let raw = "```json\n{\"title\": \"SRE\", \"score\": 8}";
        assert_eq!(extract_json(raw).unwrap()["title"], "SRE");
    }

    #[test]
    fn test_balanced_object_inside_prose() {
        let raw = "The result is {\"title\": \"Data {Engineer}\", \"score\": 6} as requested.";
        let shape: Shape = parse(raw).unwrap();
        assert_eq!(shape.title, "Data {Engineer}");
    }

    #[test]
    fn test_skips_non_json_braces_before_real_object() {
        let raw = "Format {like this} then: {\"title\": \"QA\", \"score\": 5}";
        let shape: Shape = parse(raw).unwrap();
        assert_eq!(shape.title, "QA");
    }

    #[test]
    fn test_escaped_quotes_do_not_break_balance() {
        let raw = "noise {\"title\": \"say \\\"hi\\\" }\", \"score\": 1} trailing";
        let shape: Shape = parse(raw).unwrap();
        assert_eq!(shape.title, "say \"hi\" }");
    }

    #[test]
    fn test_top_level_array() {
        let value = extract_json("Here: [1, 2, 3]").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_no_json_is_parse_error() {
        let err = extract_json("I'm sorry, I can't help with that.").unwrap_err();
        assert_eq!(err.raw_excerpt, "I'm sorry, I can't help with that.");
    }

    #[test]
    fn test_bare_scalar_is_not_structured() {
        assert!(extract_json("42").is_err());
        assert!(extract_json("\"just a string\"").is_err());
    }

    #[test]
    fn test_unclosed_bracket_in_prose_does_not_hide_object() {
        let value = extract_json("Here is the roadmap [see notes below:\n{\"a\": 1}").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_truncated_object_does_not_fall_back_to_inner_object() {
        let raw = "{\"outer\": {\"title\": \"QA\", \"score\": 5}, \"more\": [";
        assert!(extract_json(raw).is_err());
    }

    #[test]
    fn test_wrong_shape_is_parse_error_not_default() {
        let err = parse::<Shape>("{\"title\": \"QA\"}").unwrap_err();
        assert!(err.reason.contains("expected shape"));
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let raw = "x".repeat(1000);
        let err = extract_json(&raw).unwrap_err();
        assert_eq!(err.raw_excerpt.chars().count(), EXCERPT_CHARS + 1);
    }
}
