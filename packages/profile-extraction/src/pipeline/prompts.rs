//! LLM prompts for profile extraction.
//!
//! The "only the JSON object" wording is load-bearing: the greedy
//! brace extractor assumes the response holds a single object.

use crate::types::{message::RequestMessage, page::Corpus};

/// System message sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// The exact JSON shape requested from the model.
pub const PROFILE_SHAPE: &str = r#"{
  "name": "...",
  "age": "...",
  "job": "...",
  "location": "...",
  "education": "...",
  "interests": ["...", "..."]
}"#;

/// Instructions for the first attempt of a run.
pub const PROFILE_PROMPT: &str = r#"You are given text from multiple web pages where a certain person appeared.
Your task is to build a concise JSON profile about this person based on any matching information
you find in these pages. Make sure to only include details about the individual.
The JSON must follow this structure:

{shape}

If any field is unknown or cannot be found, omit it.
Respond with ONLY the JSON object. Do not add commentary, explanations, or markdown code fences."#;

/// Instructions for a correction attempt.
pub const CORRECTION_PROMPT: &str = r#"Your previous response did not contain valid JSON.
Please correct your output and provide strictly valid JSON based on the following context.
The JSON must follow this structure:

{shape}

If any field is unknown or cannot be found, omit it.
Do not include additional commentary, just return the valid JSON object."#;

/// Format the first-attempt prompt around the corpus.
pub fn format_profile_prompt(corpus: &str) -> String {
    format!(
        "{}\n\nHere is the text from the webpages:\n{}\n",
        PROFILE_PROMPT.replace("{shape}", PROFILE_SHAPE),
        corpus
    )
}

/// Format a correction prompt re-embedding the corpus and the rejected output.
pub fn format_correction_prompt(corpus: &str, previous_response: &str) -> String {
    format!(
        "{}\nContext: {}\nYour previous (invalid) JSON response:\n{}\n",
        CORRECTION_PROMPT.replace("{shape}", PROFILE_SHAPE),
        corpus,
        previous_response
    )
}

/// Build the request for the first attempt of a run.
pub fn build_initial_request(corpus: &Corpus) -> Vec<RequestMessage> {
    vec![
        RequestMessage::system(SYSTEM_PROMPT),
        RequestMessage::user(format_profile_prompt(corpus.as_str())),
    ]
}

/// Build the request for a correction attempt.
///
/// The collaborator keeps no memory between calls, so the corpus is sent again.
pub fn build_correction_request(corpus: &Corpus, previous_response: &str) -> Vec<RequestMessage> {
    vec![
        RequestMessage::system(SYSTEM_PROMPT),
        RequestMessage::user(format_correction_prompt(corpus.as_str(), previous_response)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::message::Role;
    use crate::types::profile::PROFILE_FIELDS;

    #[test]
    fn test_initial_request_shape() {
        let corpus = Corpus::from_texts(["Jane Roe, engineer"]);
        let messages = build_initial_request(&corpus);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("Jane Roe, engineer"));
        assert!(messages[1].content.contains("ONLY the JSON object"));
        for field in PROFILE_FIELDS {
            assert!(messages[1].content.contains(&format!("\"{}\"", field)));
        }
    }

    #[test]
    fn test_correction_request_embeds_corpus_and_previous() {
        let corpus = Corpus::from_texts(["Page one", "Page two"]);
        let previous = "Sure! Here is the profile: {name: Jane";
        let messages = build_correction_request(&corpus, previous);

        let user = &messages[1].content;
        assert!(user.contains("did not contain valid JSON"));
        assert!(user.contains("Page one\n\nPage two\n\n"));
        assert!(user.contains(previous));
        assert!(user.contains(PROFILE_SHAPE));
    }

    #[test]
    fn test_placeholders_in_corpus_are_not_expanded() {
        let corpus = Corpus::from_texts(["literal {shape} in page"]);
        let messages = build_initial_request(&corpus);
        assert!(messages[1].content.contains("literal {shape} in page"));
    }

    #[test]
    fn test_empty_corpus_still_builds() {
        let messages = build_initial_request(&Corpus::default());
        assert!(messages[1]
            .content
            .ends_with("Here is the text from the webpages:\n\n"));
    }
}
