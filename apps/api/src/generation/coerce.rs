//! Schema Coercer: parses sanitized model text as JSON and validates it
//! against the expected assignment (or syllabus) shape.
//!
//! A cheap `{...}` bracket pre-check filters the common failure mode
//! (truncated or prose-wrapped responses) before paying for a full parse,
//! and gives a clearer diagnostic than a generic parse failure. If the model
//! wraps its JSON in explanatory prose despite instructions, coercion fails
//! loudly; the caller decides whether to retry the LLM call.

use serde_json::Value;
use thiserror::Error;

use crate::generation::AssignmentKind;

/// Decoded top-level mapping from the model. Deeper normalization happens in
/// the assembler.
pub type ParsedPayload = serde_json::Map<String, Value>;

const PREVIEW_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("response does not appear to be a valid JSON object (cleaned: {preview:?})")]
    NotAnObject { preview: String },

    #[error("response is not valid JSON: {source} (cleaned: {preview:?})")]
    InvalidJson {
        source: serde_json::Error,
        preview: String,
    },

    #[error("response is missing required field `{field}` for {kind} assignments")]
    MissingField {
        field: &'static str,
        kind: AssignmentKind,
    },
}

/// Parses sanitized text and checks the required top-level fields for the
/// expected assignment kind. On success the decoded mapping is returned
/// unmodified.
pub fn coerce(sanitized: &str, kind: AssignmentKind) -> Result<ParsedPayload, FormatError> {
    let payload = coerce_object(sanitized)?;
    for &field in kind.required_fields() {
        if !payload.contains_key(field) {
            return Err(FormatError::MissingField { field, kind });
        }
    }
    Ok(payload)
}

/// Parses sanitized text into a JSON object with no field requirements.
/// Used for syllabus extraction, where the shape is free-form.
pub fn coerce_object(sanitized: &str) -> Result<ParsedPayload, FormatError> {
    let text = sanitized.trim();

    if !(text.starts_with('{') && text.ends_with('}')) {
        return Err(FormatError::NotAnObject {
            preview: preview(text),
        });
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(FormatError::NotAnObject {
            preview: preview(text),
        }),
        Err(source) => Err(FormatError::InvalidJson {
            source,
            preview: preview(text),
        }),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::sanitize::sanitize;

    #[test]
    fn test_valid_object_round_trips_through_sanitize_and_coerce() {
        let original = serde_json::json!({
            "questions": [{"question": "Q1", "points": 5}],
            "answer_key": [{"key": "a"}]
        });
        let fenced = format!("```json\n{}\n```", serde_json::to_string(&original).unwrap());

        let payload = coerce(&sanitize(&fenced), AssignmentKind::MultipleChoice).unwrap();
        assert_eq!(Value::Object(payload), original);
    }

    #[test]
    fn test_fenced_empty_collections_scenario() {
        let input = "```json\n{\"questions\":[],\"answer_key\":{}}\n```";
        let payload = coerce(&sanitize(input), AssignmentKind::ShortAnswer).unwrap();
        assert!(payload.contains_key("questions"));
        assert!(payload.contains_key("answer_key"));
    }

    #[test]
    fn test_prose_wrapped_json_fails_with_not_an_object() {
        let input = "Sure! Here's the JSON: {\"title\":\"x\"}";
        let err = coerce_object(input).unwrap_err();
        assert!(matches!(err, FormatError::NotAnObject { .. }));
    }

    #[test]
    fn test_trailing_prose_fails_the_bracket_pre_check() {
        let input = "{\"title\":\"x\"} hope this helps!";
        let err = coerce_object(input).unwrap_err();
        assert!(matches!(err, FormatError::NotAnObject { .. }));
    }

    #[test]
    fn test_truncated_object_fails_without_a_full_parse() {
        let input = "{\"questions\": [{\"question\": \"unfinished";
        let err = coerce_object(input).unwrap_err();
        assert!(matches!(err, FormatError::NotAnObject { .. }));
    }

    #[test]
    fn test_syntactically_broken_object_is_invalid_json() {
        let input = "{\"questions\": [,]}";
        let err = coerce_object(input).unwrap_err();
        assert!(matches!(err, FormatError::InvalidJson { .. }));
    }

    #[test]
    fn test_missing_questions_field_for_multiple_choice() {
        let input = "{\"answer_key\": []}";
        let err = coerce(input, AssignmentKind::MultipleChoice).unwrap_err();
        match err {
            FormatError::MissingField { field, kind } => {
                assert_eq!(field, "questions");
                assert_eq!(kind, AssignmentKind::MultipleChoice);
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_essay_requires_rubric_not_questions() {
        let payload = coerce("{\"rubric\": []}", AssignmentKind::Essay).unwrap();
        assert!(payload.contains_key("rubric"));

        let err = coerce("{\"questions\": []}", AssignmentKind::Essay).unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingField {
                field: "rubric",
                ..
            }
        ));
    }

    #[test]
    fn test_discussion_requires_participation_criteria() {
        let err = coerce("{}", AssignmentKind::Discussion).unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingField {
                field: "participation_criteria",
                ..
            }
        ));
    }

    #[test]
    fn test_preview_is_truncated_to_200_chars() {
        let long = format!("not json {}", "x".repeat(500));
        match coerce_object(&long).unwrap_err() {
            FormatError::NotAnObject { preview } => {
                assert_eq!(preview.chars().count(), 200);
            }
            other => panic!("expected NotAnObject, got {other:?}"),
        }
    }
}
