//! Condenses upstream error bodies into a single line for `details`.

use serde_json::Value;

const MAX_RAW_DETAILS: usize = 2000;

/// Pulls a human-readable message out of a provider error payload.
pub fn extract_error_summary(value: &Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                Value::String(s) => Some(s.to_string()),
                Value::Object(map) => map
                    .get("message")
                    .and_then(|message| message.as_str().map(str::to_owned)),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

/// Summary when the body is JSON with a recognisable message, otherwise the
/// raw body (whitespace-collapsed, bounded).
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty response body>".to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            return summary;
        }
    }

    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_RAW_DETAILS {
        let mut cut: String = collapsed.chars().take(MAX_RAW_DETAILS).collect();
        cut.push('…');
        cut
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_style_error_is_summarized() {
        let raw = r#"{"error":{"code":400,"message":"API key not valid.  Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            summarize_error_body(raw),
            "API key not valid. Please pass a valid API key."
        );
    }

    #[test]
    fn string_error_and_top_level_message_are_recognised() {
        assert_eq!(
            summarize_error_body(r#"{"error":"model overloaded"}"#),
            "model overloaded"
        );
        assert_eq!(
            summarize_error_body(r#"{"message":"No endpoints found"}"#),
            "No endpoints found"
        );
    }

    #[test]
    fn unrecognised_bodies_are_passed_through() {
        assert_eq!(summarize_error_body(r#"{"status":"failed"}"#), r#"{"status":"failed"}"#);
        assert_eq!(summarize_error_body("<html>\n bad gateway </html>"), "<html> bad gateway </html>");
        assert_eq!(summarize_error_body("   "), "<empty response body>");
    }

    #[test]
    fn very_long_bodies_are_bounded() {
        let long = "x".repeat(MAX_RAW_DETAILS + 50);
        let summary = summarize_error_body(&long);
        assert_eq!(summary.chars().count(), MAX_RAW_DETAILS + 1);
        assert!(summary.ends_with('…'));
    }
}
