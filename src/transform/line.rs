//! Decoding of a single upstream event line.
//!
//! Each logical record is one line: optional whitespace, a `data: ` prefix,
//! then either the `[DONE]` sentinel or a JSON payload. Anything else
//! (blank lines, `:` comments, malformed JSON, partial frames) is expected
//! transient noise and is skipped, never surfaced as an error.

use serde_json::Value;

/// Literal prefix every payload-bearing line must start with.
const DATA_PREFIX: &str = "data: ";

/// Literal sentinel marking end-of-stream.
const DONE_SENTINEL: &str = "[DONE]";

/// One decoded upstream record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A fragment of generated text.
    Text(String),
    /// The end-of-stream sentinel.
    Done,
    /// Nothing extractable from this line.
    Skip,
}

/// Decode one complete line from the upstream stream.
pub fn parse_line(raw: &str) -> LineEvent {
    let line = raw.trim();
    if line.is_empty() || line.starts_with(':') {
        return LineEvent::Skip;
    }

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return LineEvent::Skip;
    };

    if payload == DONE_SENTINEL {
        return LineEvent::Done;
    }

    let Ok(value) = serde_json::from_str::<Value>(payload) else {
        return LineEvent::Skip;
    };

    match extract_text(&value) {
        Some(text) => LineEvent::Text(text),
        None => LineEvent::Skip,
    }
}

/// Decode the residual line at end of stream.
///
/// Same framing rules as [`parse_line`], but only the `response` field is
/// consulted; the `choices[0].delta.content` fallback does not apply to the
/// final flush.
pub fn parse_flush_line(raw: &str) -> Option<String> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let payload = line.strip_prefix(DATA_PREFIX)?;
    if payload == DONE_SENTINEL {
        return None;
    }

    let value: Value = serde_json::from_str(payload).ok()?;
    response_field(&value)
}

/// Extract text from a payload: a non-empty `response` string wins, else a
/// non-empty `choices[0].delta.content`.
fn extract_text(value: &Value) -> Option<String> {
    if let Some(text) = response_field(value) {
        return Some(text);
    }

    value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

fn response_field(value: &Value) -> Option<String> {
    value
        .get("response")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_field() {
        assert_eq!(
            parse_line("data: {\"response\":\"Hello\"}"),
            LineEvent::Text("Hello".to_string())
        );
    }

    #[test]
    fn test_delta_content_fallback() {
        assert_eq!(
            parse_line("data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}"),
            LineEvent::Text("Hi".to_string())
        );
    }

    #[test]
    fn test_empty_response_falls_through_to_delta() {
        let line = "data: {\"response\":\"\",\"choices\":[{\"delta\":{\"content\":\"x\"}}]}";
        assert_eq!(parse_line(line), LineEvent::Text("x".to_string()));
    }

    #[test]
    fn test_done_sentinel() {
        assert_eq!(parse_line("data: [DONE]"), LineEvent::Done);
        assert_eq!(parse_line("  data: [DONE]\r"), LineEvent::Done);
    }

    #[test]
    fn test_skipped_lines() {
        assert_eq!(parse_line(""), LineEvent::Skip);
        assert_eq!(parse_line("   "), LineEvent::Skip);
        assert_eq!(parse_line(": keep-alive comment"), LineEvent::Skip);
        assert_eq!(parse_line("event: message"), LineEvent::Skip);
        assert_eq!(parse_line("data: {not json"), LineEvent::Skip);
        assert_eq!(parse_line("data: {\"usage\":{\"total_tokens\":3}}"), LineEvent::Skip);
        assert_eq!(parse_line("data: {\"response\":null}"), LineEvent::Skip);
        assert_eq!(parse_line("data: {\"choices\":[]}"), LineEvent::Skip);
    }

    #[test]
    fn test_flush_only_reads_response() {
        assert_eq!(
            parse_flush_line("data: {\"response\":\"tail\"}"),
            Some("tail".to_string())
        );
        // The delta fallback is deliberately absent on flush.
        assert_eq!(
            parse_flush_line("data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}"),
            None
        );
        assert_eq!(parse_flush_line("data: [DONE]"), None);
        assert_eq!(parse_flush_line(": comment"), None);
    }
}
