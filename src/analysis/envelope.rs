//! Locates the model's text inside the response envelope.
//!
//! Completion APIs wrap the same text in different JSON shapes depending on
//! endpoint and version. Strategies are tried in order; the first one that
//! finds a string wins.

use serde_json::Value;

type Strategy = fn(&Value) -> Option<&str>;

/// Known envelope shapes, most specific first.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("output string", output_string),
    ("output message items", output_message_text),
    ("output.content", output_content),
    ("output_text", output_text),
    ("choices[0].message.content", chat_choice),
];

/// Returns the text payload of a response, or `None` for unknown shapes.
pub fn extract_text(body: &Value) -> Option<&str> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let text = strategy(body)?;
        tracing::debug!("Response text found via {}", name);
        Some(text)
    })
}

/// Returns the upstream error message of an error body, if present.
pub fn error_message(body: &Value) -> Option<&str> {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .or_else(|| body.get("message").and_then(Value::as_str))
}

fn output_string(body: &Value) -> Option<&str> {
    body.get("output")?.as_str()
}

fn output_message_text(body: &Value) -> Option<&str> {
    body.get("output")?
        .as_array()?
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
        .filter_map(|item| item.get("content")?.as_array())
        .flatten()
        .find(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))?
        .get("text")?
        .as_str()
}

fn output_content(body: &Value) -> Option<&str> {
    body.get("output")?.get("content")?.as_str()
}

fn output_text(body: &Value) -> Option<&str> {
    body.get("output_text")?.as_str()
}

fn chat_choice(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/message/content")?.as_str()
}

/// Strips a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. `json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_string() {
        let body = json!({"output": "{\"rating\": 4}"});
        assert_eq!(extract_text(&body), Some("{\"rating\": 4}"));
    }

    #[test]
    fn test_responses_api_items() {
        let body = json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "web_search_call", "status": "completed"},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "answer", "annotations": []}
                ]}
            ]
        });
        assert_eq!(extract_text(&body), Some("answer"));
    }

    #[test]
    fn test_output_content() {
        let body = json!({"output": {"content": "nested"}});
        assert_eq!(extract_text(&body), Some("nested"));
    }

    #[test]
    fn test_output_text_field() {
        let body = json!({"output": [], "output_text": "flat"});
        assert_eq!(extract_text(&body), Some("flat"));
    }

    #[test]
    fn test_chat_completions() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "chat"}}]});
        assert_eq!(extract_text(&body), Some("chat"));
    }

    #[test]
    fn test_first_strategy_wins() {
        let body = json!({"output": "first", "output_text": "second"});
        assert_eq!(extract_text(&body), Some("first"));
    }

    #[test]
    fn test_unknown_shape() {
        assert_eq!(extract_text(&json!({"result": "x"})), None);
        assert_eq!(extract_text(&json!({"output": [{"type": "message", "content": []}]})), None);
        assert_eq!(extract_text(&json!([1, 2, 3])), None);
    }

    #[test]
    fn test_error_message() {
        let body = json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}});
        assert_eq!(error_message(&body), Some("Incorrect API key provided"));
        assert_eq!(error_message(&json!({"error": "plain"})), Some("plain"));
        assert_eq!(error_message(&json!({"message": "top"})), Some("top"));
        assert_eq!(error_message(&json!({"status": 500})), None);
    }

    #[test]
    fn test_error_message_skips_object_without_message() {
        let body = json!({"error": {"code": "server_error"}, "message": "Service overloaded"});
        assert_eq!(error_message(&body), Some("Service overloaded"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }
}
