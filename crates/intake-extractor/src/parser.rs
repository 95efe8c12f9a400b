//! Parse model replies into record candidates

use crate::error::ExtractorError;
use serde_json::Value;
use tracing::debug;

/// A loosely-typed entity from the reply, not yet normalized
pub type ParsedRecordCandidate = Value;

/// Parse error text when the reply holds no JSON array
pub const NO_STRUCTURED_DATA: &str = "no structured data found";

/// Parse error text when the reply's array is empty
pub const EMPTY_RESULT: &str = "empty result";

/// Parse a model reply into candidates
///
/// Surrounding prose, markdown fences and sign-offs are ignored: the array is
/// taken from the leftmost `[` to the rightmost `]`.
pub fn parse_reply(reply: &str) -> Result<Vec<ParsedRecordCandidate>, ExtractorError> {
    let json_str = extract_array(reply)
        .ok_or_else(|| ExtractorError::Parse(NO_STRUCTURED_DATA.to_string()))?;

    let candidates = match serde_json::from_str::<Value>(json_str) {
        Ok(Value::Array(items)) => items,
        Ok(_) => return Err(ExtractorError::Parse(NO_STRUCTURED_DATA.to_string())),
        Err(e) => {
            debug!("Bracketed reply segment is not JSON: {}", e);
            return Err(ExtractorError::Parse(NO_STRUCTURED_DATA.to_string()));
        }
    };

    if candidates.is_empty() {
        return Err(ExtractorError::Parse(EMPTY_RESULT.to_string()));
    }

    Ok(candidates)
}

/// Slice from the leftmost `[` to the rightmost `]`, if both exist in order
fn extract_array(reply: &str) -> Option<&str> {
    let start = reply.find('[')?;
    let end = reply.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&reply[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bare_array() {
        let candidates = parse_reply(r#"[{"Want (desired outcome)": "exports"}]"#).unwrap();
        assert_eq!(candidates, vec![json!({"Want (desired outcome)": "exports"})]);
    }

    #[test]
    fn test_parse_array_surrounded_by_prose() {
        let reply = "Here you go:\n[{\"When (контекст/триггер)\":\"busy season\",\"Want (желаемый результат)\":\"faster export\"}]\nThanks!";
        let candidates = parse_reply(reply).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["When (контекст/триггер)"], "busy season");
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let reply = "```json\n[\n  {\"Feature requests\": [\"vacation plans\"]}\n]\n```";
        let candidates = parse_reply(reply).unwrap();
        assert_eq!(candidates[0]["Feature requests"][0], "vacation plans");
    }

    #[test]
    fn test_parse_no_brackets() {
        let err = parse_reply("no data available").unwrap_err();
        assert_eq!(err, ExtractorError::Parse(NO_STRUCTURED_DATA.to_string()));
    }

    #[test]
    fn test_parse_brackets_in_wrong_order() {
        let err = parse_reply("see ] and then [").unwrap_err();
        assert_eq!(err, ExtractorError::Parse(NO_STRUCTURED_DATA.to_string()));
    }

    #[test]
    fn test_parse_bracketed_prose_is_not_data() {
        let err = parse_reply("I found [two users] in the call").unwrap_err();
        assert_eq!(err, ExtractorError::Parse(NO_STRUCTURED_DATA.to_string()));
    }

    #[test]
    fn test_parse_brackets_in_trailing_prose_break_the_slice() {
        // Rightmost-bracket extraction spans into the note and stops being JSON
        let reply = "[{\"Want (desired outcome)\":\"x\"}]\nNote [1]: paraphrased";
        assert!(matches!(parse_reply(reply), Err(ExtractorError::Parse(_))));
    }

    #[test]
    fn test_parse_empty_array() {
        let err = parse_reply("Nothing relevant: []").unwrap_err();
        assert_eq!(err, ExtractorError::Parse(EMPTY_RESULT.to_string()));
    }

    #[test]
    fn test_parse_keeps_entity_order() {
        let reply = r#"[{"User": {"Name": "Ann"}}, {"User": {"Name": "Ben"}}]"#;
        let candidates = parse_reply(reply).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0]["User"]["Name"], "Ann");
    }

    #[test]
    fn test_nested_arrays_stay_intact() {
        let reply = r#"Result: [{"Feature requests": ["a", "b"]}] done"#;
        let candidates = parse_reply(reply).unwrap();
        assert_eq!(candidates[0]["Feature requests"], json!(["a", "b"]));
    }
}
