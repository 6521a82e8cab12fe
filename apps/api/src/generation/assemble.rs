//! Content Assembler: merges the coerced AI payload with caller-supplied
//! metadata into a persistable `AssignmentRecord`.
//!
//! Every step is a pure transformation with no I/O. The model's own question
//! numbering is not trusted: both collections are re-indexed 1..N in order so
//! answer-key positions stay aligned with questions. Collections the model
//! did not produce come out as empty sequences, never missing fields.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::generation::coerce::ParsedPayload;
use crate::generation::{snake_case, AssignmentKind, GenerateAssignmentRequest};
use crate::models::assignment::{
    AnswerKeyEntry, AssignmentRecord, InstructionSection, Question,
};

/// Builds the final assignment aggregate from the coerced payload.
pub fn assemble(
    payload: ParsedPayload,
    request: &GenerateAssignmentRequest,
    kind: AssignmentKind,
    created_by: &str,
    now: DateTime<Utc>,
) -> AssignmentRecord {
    let mut questions: Vec<Question> = decode_collection(payload.get("questions"));
    for (index, question) in questions.iter_mut().enumerate() {
        question.question_id = index as i64 + 1;
        if kind != AssignmentKind::MultipleChoice {
            question.options.clear();
        }
    }

    let mut answer_key: Vec<AnswerKeyEntry> = decode_collection(payload.get("answer_key"));
    for (index, entry) in answer_key.iter_mut().enumerate() {
        entry.question_id = index as i64 + 1;
    }

    AssignmentRecord {
        title: request.title.clone(),
        description: request.description.clone(),
        assignment_type: snake_case(&request.question_type.title),
        grade: request.grade.clone(),
        subject: request.subject.clone(),
        difficulty_level: request.difficulty.clone(),
        course: request.course,
        created_by: created_by.to_string(),
        is_active: true,
        questions,
        answer_key,
        instructions: decode_instructions(payload.get("instructions")),
        rubric: decode_collection(payload.get("rubric")),
        checklist: decode_collection(payload.get("checklist")),
        participation_criteria: decode_collection(payload.get("participation_criteria")),
        created_at: now,
        updated_at: now,
    }
}

/// Decodes a payload field into a typed collection. Anything that is not an
/// array (missing, `{}`, a string) becomes an empty sequence; malformed
/// elements are dropped with a warning rather than failing the record.
fn decode_collection<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Dropping malformed collection entry: {e}");
                None
            }
        })
        .collect()
}

/// Instructions arrive either as a flat array of sections or wrapped in a
/// `{"sections": [...]}` object depending on the model's mood.
fn decode_instructions(value: Option<&Value>) -> Vec<InstructionSection> {
    match value {
        Some(Value::Object(map)) => decode_collection(map.get("sections")),
        other => decode_collection(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::QuestionTypeConfig;
    use uuid::Uuid;

    fn request(kind_title: &str) -> GenerateAssignmentRequest {
        GenerateAssignmentRequest {
            title: "Unit 3 Quiz".to_string(),
            description: "Photosynthesis basics".to_string(),
            course: Uuid::new_v4(),
            grade: "8".to_string(),
            subject: "Biology".to_string(),
            difficulty: "medium".to_string(),
            question_type: QuestionTypeConfig {
                title: kind_title.to_string(),
                description: String::new(),
                outputs: vec![],
            },
            number_of_questions: Some(3),
        }
    }

    fn payload_from(json: Value) -> ParsedPayload {
        match json {
            Value::Object(map) => map,
            other => panic!("test payload must be an object, got {other:?}"),
        }
    }

    #[test]
    fn test_reindexes_both_collections_one_to_n_in_order() {
        let payload = payload_from(serde_json::json!({
            "questions": [
                {"question": "Q1", "type": "multiple_choice", "points": 5, "questionId": 42,
                 "options": ["a. A", "b. B", "c. C", "d. D"]},
                {"question": "Q2", "type": "multiple_choice", "points": 5, "questionId": 42,
                 "options": ["a. A", "b. B", "c. C", "d. D"]},
                {"question": "Q3", "type": "multiple_choice", "points": 5,
                 "options": ["a. A", "b. B", "c. C", "d. D"]}
            ],
            "answer_key": [
                {"questionId": 9, "key": "a", "value": "A"},
                {"questionId": 9, "key": "b", "value": "B"},
                {"key": "c", "value": "C"}
            ]
        }));

        let record = assemble(
            payload,
            &request("Multiple Choice Test"),
            AssignmentKind::MultipleChoice,
            "teacher@school.edu",
            Utc::now(),
        );

        let q_ids: Vec<i64> = record.questions.iter().map(|q| q.question_id).collect();
        let a_ids: Vec<i64> = record.answer_key.iter().map(|a| a.question_id).collect();
        assert_eq!(q_ids, vec![1, 2, 3]);
        assert_eq!(a_ids, vec![1, 2, 3]);
        // Positional alignment preserved
        assert_eq!(record.answer_key[0].key, "a");
        assert_eq!(record.answer_key[2].key, "c");
    }

    #[test]
    fn test_empty_questions_and_object_answer_key_yield_empty_sequences() {
        // The `answer_key: {}` shape is what a model returns for kinds with
        // no questions; it must coerce to an empty sequence, not fail.
        let payload = payload_from(serde_json::json!({
            "questions": [],
            "answer_key": {}
        }));

        let record = assemble(
            payload,
            &request("Short Answer Test"),
            AssignmentKind::ShortAnswer,
            "teacher@school.edu",
            Utc::now(),
        );

        assert!(record.questions.is_empty());
        assert!(record.answer_key.is_empty());
    }

    #[test]
    fn test_unrequested_collections_are_empty_not_missing() {
        let payload = payload_from(serde_json::json!({
            "questions": [],
            "answer_key": []
        }));

        let record = assemble(
            payload,
            &request("Multiple Choice Test"),
            AssignmentKind::MultipleChoice,
            "teacher@school.edu",
            Utc::now(),
        );

        let value = serde_json::to_value(&record).unwrap();
        for key in ["rubric", "checklist", "instructions", "participationCriteria"] {
            assert_eq!(
                value[key],
                serde_json::json!([]),
                "{key} must serialize as an empty array"
            );
        }
    }

    #[test]
    fn test_options_cleared_for_non_multiple_choice_kinds() {
        let payload = payload_from(serde_json::json!({
            "questions": [
                {"question": "Explain osmosis", "type": "short_answer", "points": 10,
                 "options": ["a. stray", "b. options"]}
            ],
            "answer_key": [{"key": "diffusion of water", "value": "diffusion of water"}]
        }));

        let record = assemble(
            payload,
            &request("Short Answer Test"),
            AssignmentKind::ShortAnswer,
            "teacher@school.edu",
            Utc::now(),
        );

        assert!(record.questions[0].options.is_empty());
    }

    #[test]
    fn test_stamps_context_and_derives_type_token() {
        let now = Utc::now();
        let req = request("Multiple Choice Test");
        let payload = payload_from(serde_json::json!({"questions": [], "answer_key": []}));

        let record = assemble(
            payload,
            &req,
            AssignmentKind::MultipleChoice,
            "teacher@school.edu",
            now,
        );

        assert_eq!(record.assignment_type, "multiple_choice_test");
        assert_eq!(record.created_by, "teacher@school.edu");
        assert!(record.is_active);
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
        assert_eq!(record.course, req.course);
    }

    #[test]
    fn test_instructions_accept_both_flat_and_sections_shapes() {
        let flat = payload_from(serde_json::json!({
            "rubric": [],
            "instructions": [{"title": "Overview", "content": "Read chapter 4"}]
        }));
        let wrapped = payload_from(serde_json::json!({
            "rubric": [],
            "instructions": {"sections": [{"title": "Overview", "content": "Read chapter 4"}]}
        }));

        for payload in [flat, wrapped] {
            let record = assemble(
                payload,
                &request("Essay"),
                AssignmentKind::Essay,
                "teacher@school.edu",
                Utc::now(),
            );
            assert_eq!(record.instructions.len(), 1);
            assert_eq!(record.instructions[0].title, "Overview");
        }
    }

    #[test]
    fn test_malformed_collection_entries_are_dropped() {
        let payload = payload_from(serde_json::json!({
            "questions": [
                {"question": "Q1", "type": "multiple_choice", "points": 5},
                "not an object"
            ],
            "answer_key": [{"key": "a"}]
        }));

        let record = assemble(
            payload,
            &request("Multiple Choice Test"),
            AssignmentKind::MultipleChoice,
            "teacher@school.edu",
            Utc::now(),
        );

        assert_eq!(record.questions.len(), 1);
        assert_eq!(record.questions[0].question_id, 1);
    }

    #[test]
    fn test_rubric_accepts_capitalized_source_keys() {
        let payload = payload_from(serde_json::json!({
            "rubric": [
                {"Criterion": "Thesis clarity", "Points": 10, "Description": "Clear argument"}
            ]
        }));

        let record = assemble(
            payload,
            &request("Essay"),
            AssignmentKind::Essay,
            "teacher@school.edu",
            Utc::now(),
        );

        assert_eq!(record.rubric.len(), 1);
        assert_eq!(record.rubric[0].criterion, "Thesis clarity");
        assert_eq!(record.rubric[0].points, 10.0);
    }
}
