//! Locating a JSON object inside free-form model output.
//!
//! Extraction only finds a candidate span; parsing is a separate step.

/// Finds the JSON candidate in a raw completion.
pub trait JsonExtractor: Send + Sync {
    /// Return the candidate substring, or `None` when there is nothing to parse.
    fn extract<'a>(&self, text: &'a str) -> Option<&'a str>;
}

/// First `{` to last `}`, inclusive.
///
/// Greedy on purpose: stopping at the first `}` would cut nested objects
/// short, while over-capturing prose is caught by the parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyBraceExtractor;

impl JsonExtractor for GreedyBraceExtractor {
    fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        extract_json_object(text)
    }
}

/// Free-function form of [`GreedyBraceExtractor`].
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_surrounding_noise() {
        assert_eq!(
            extract_json_object(r#"noise {"a":1} more noise"#),
            Some(r#"{"a":1}"#)
        );
    }

    #[test]
    fn test_no_braces() {
        assert_eq!(extract_json_object("no braces here"), None);
    }

    #[test]
    fn test_greedy_to_last_close() {
        assert_eq!(
            extract_json_object(r#"{"a":{"b":1}} trailing"#),
            Some(r#"{"a":{"b":1}}"#)
        );
    }

    #[test]
    fn test_code_fence() {
        let raw = "Here you go:\n```json\n{\"name\": \"Ada\", \"interests\": [\"x\"]}\n```";
        assert_eq!(
            extract_json_object(raw),
            Some("{\"name\": \"Ada\", \"interests\": [\"x\"]}")
        );
    }

    #[test]
    fn test_close_before_open() {
        assert_eq!(extract_json_object("} then {"), None);
        assert_eq!(extract_json_object("only an open {"), None);
    }

    #[test]
    fn test_over_capture_spans_two_objects() {
        // Parser rejects this span; the extractor does not try to be clever.
        assert_eq!(extract_json_object("{\"a\":1} and {\"b\":2}"), Some("{\"a\":1} and {\"b\":2}"));
    }

    proptest! {
        #[test]
        fn prop_prose_without_braces_is_stripped(
            prefix in "[^{}]{0,40}",
            suffix in "[^{}]{0,40}",
            key in "[a-z]{1,8}",
            value in 0i64..1000,
        ) {
            let object = format!("{{\"{}\":{{\"n\":{}}}}}", key, value);
            let text = format!("{}{}{}", prefix, object, suffix);
            prop_assert_eq!(extract_json_object(&text), Some(object.as_str()));
        }

        #[test]
        fn prop_span_is_brace_delimited(text in ".{0,80}") {
            if let Some(span) = extract_json_object(&text) {
                prop_assert!(span.starts_with('{'), "span does not start with '{{': {:?}", span);
                prop_assert!(span.ends_with('}'), "span does not end with '}}': {:?}", span);
            }
        }
    }
}
