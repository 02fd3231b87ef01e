//! Best-effort unwrapping of model output envelopes.
//!
//! Generation sometimes returns the answer wrapped in code fences, a
//! JSON object under a well-known key, or stray quotes. This module
//! peels those layers without ever failing: if nothing matches, the
//! trimmed raw text is returned as-is.

use serde_json::Value;

/// Keys under which models tend to hide the actual answer.
const TEXT_KEYS: &[&str] = &[
    "text",
    "message",
    "question",
    "content",
    "response",
    "answer",
    "wait_text",
    "extracted_text",
];

/// Strips fences and envelopes, returning the inner text.
pub fn unwrap_model_text(raw: &str) -> String {
    let text = strip_code_fences(raw.trim());

    if let Some(extracted) = extract_text_field(text) {
        return extracted;
    }
    // an object embedded in surrounding prose
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Some(extracted) = extract_text_field(&text[start..=end]) {
                return extracted;
            }
        }
    }

    text.trim_matches('"').trim().to_string()
}

/// Strips fences and parses the remainder as a JSON value.
pub fn parse_fenced_json(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(strip_code_fences(raw.trim()))
}

fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            if let Some(inner) = rest.strip_suffix("```") {
                return inner.trim();
            }
        }
    }
    text
}

fn extract_text_field(candidate: &str) -> Option<String> {
    let value: Value = serde_json::from_str(candidate.trim()).ok()?;
    let object = value.as_object()?;
    for key in TEXT_KEYS {
        if let Some(text) = object.get(*key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(unwrap_model_text("아이가 쌕쌕거리나요?"), "아이가 쌕쌕거리나요?");
    }

    #[test]
    fn json_fences_are_stripped() {
        let raw = "```json\n{\"question\": \"밤에 기침이 심한가요?\"}\n```";
        assert_eq!(unwrap_model_text(raw), "밤에 기침이 심한가요?");
    }

    #[test]
    fn bare_fences_are_stripped() {
        let raw = "```\n그냥 텍스트\n```";
        assert_eq!(unwrap_model_text(raw), "그냥 텍스트");
    }

    #[test]
    fn known_keys_are_extracted() {
        for key in ["text", "message", "answer", "wait_text"] {
            let raw = format!("{{\"{key}\": \"추출된 값\"}}");
            assert_eq!(unwrap_model_text(&raw), "추출된 값", "{key}");
        }
    }

    #[test]
    fn embedded_object_in_prose_is_found() {
        let raw = "물론이죠! {\"question\": \"가슴이 답답한가요?\"} 입니다.";
        assert_eq!(unwrap_model_text(raw), "가슴이 답답한가요?");
    }

    #[test]
    fn surrounding_quotes_are_trimmed() {
        assert_eq!(unwrap_model_text("\"인용된 질문\""), "인용된 질문");
    }

    #[test]
    fn unknown_json_shape_is_returned_verbatim() {
        let raw = "{\"other\": 1}";
        assert_eq!(unwrap_model_text(raw), "{\"other\": 1}");
    }

    #[test]
    fn parse_fenced_json_reads_fenced_objects() {
        let value = parse_fenced_json("```json\n{\"total_positive\": 3}\n```").unwrap();
        assert_eq!(value["total_positive"], 3);
    }
}
