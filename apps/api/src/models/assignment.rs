//! Assignment domain types.
//!
//! `AssignmentRecord` is the in-memory aggregate the generation pipeline
//! produces and the edit operations mutate; `AssignmentRow` is its persisted
//! form with nested collections stored as JSONB. The record is created once
//! (at generation or manual-add time) and owned by the persistence layer
//! thereafter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A single question. `question_id` is a 1-based sequential identifier
/// assigned in creation order, never the model's own numbering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub question_id: i64,
    #[serde(alias = "questionText")]
    pub question: String,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub points: f64,
    /// Four choices for multiple-choice questions, empty for every other kind.
    #[serde(default)]
    pub options: Vec<String>,
}

/// The correct-answer record paired to one question by shared `question_id`.
/// For multiple choice `key` is the option letter and `value` the option text;
/// for other kinds both carry the expected answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerKeyEntry {
    #[serde(default)]
    pub question_id: i64,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricCriterion {
    #[serde(alias = "Criterion")]
    pub criterion: String,
    #[serde(alias = "Points", default)]
    pub points: f64,
    #[serde(alias = "Description", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub item: String,
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipationCriterion {
    #[serde(alias = "Description")]
    pub description: String,
    #[serde(alias = "Points", default)]
    pub points: Option<f64>,
}

/// The assembled assignment aggregate.
///
/// Invariant: `answer_key.len() == questions.len()` and each entry's
/// `question_id` matches exactly one question, assigned in creation order
/// starting at 1. Optional collections are always present as empty sequences,
/// never absent fields, so storage validation cannot fail on structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub assignment_type: String,
    pub grade: String,
    pub subject: String,
    pub difficulty_level: String,
    pub course: Uuid,
    pub created_by: String,
    pub is_active: bool,
    pub questions: Vec<Question>,
    pub answer_key: Vec<AnswerKeyEntry>,
    pub instructions: Vec<InstructionSection>,
    pub rubric: Vec<RubricCriterion>,
    pub checklist: Vec<ChecklistItem>,
    pub participation_criteria: Vec<ParticipationCriterion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for manually appending a question to an existing assignment.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub question_type: String,
    pub points: f64,
    pub options: Vec<String>,
}

impl AssignmentRecord {
    /// Next sequential question id. `max + 1` rather than `len + 1` so that
    /// appends after deletions cannot collide with surviving ids.
    pub fn next_question_id(&self) -> i64 {
        self.questions
            .iter()
            .map(|q| q.question_id)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Appends a question and its paired answer-key entry under the next
    /// sequential id. Returns the assigned id.
    pub fn add_question(&mut self, new: NewQuestion, key: String, value: Option<String>) -> i64 {
        let question_id = self.next_question_id();
        self.questions.push(Question {
            question_id,
            question: new.question,
            question_type: new.question_type,
            points: new.points,
            options: new.options,
        });
        self.answer_key.push(AnswerKeyEntry {
            question_id,
            key,
            value,
        });
        question_id
    }

    /// Removes the question with the given id and its matching answer-key
    /// entry, matched by `question_id` rather than position, so earlier
    /// deletions cannot cause misalignment. Surviving ids are not compacted.
    /// Returns false when no such question exists.
    pub fn remove_question(&mut self, question_id: i64) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.question_id != question_id);
        if self.questions.len() == before {
            return false;
        }
        self.answer_key.retain(|a| a.question_id != question_id);
        true
    }

    pub fn add_rubric_criterion(&mut self, criterion: RubricCriterion) {
        self.rubric.push(criterion);
    }

    pub fn add_checklist_item(&mut self, item: ChecklistItem) {
        self.checklist.push(item);
    }

    pub fn add_instruction_section(&mut self, section: InstructionSection) {
        self.instructions.push(section);
    }

    pub fn add_participation_criterion(&mut self, criterion: ParticipationCriterion) {
        self.participation_criteria.push(criterion);
    }
}

/// Persisted assignment. Nested collections live in JSONB columns.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub assignment_type: String,
    pub grade: String,
    pub subject: String,
    pub difficulty_level: String,
    #[serde(rename = "course")]
    pub course_id: Uuid,
    pub created_by: String,
    pub is_active: bool,
    pub questions: Json<Vec<Question>>,
    pub answer_key: Json<Vec<AnswerKeyEntry>>,
    pub instructions: Json<Vec<InstructionSection>>,
    pub rubric: Json<Vec<RubricCriterion>>,
    pub checklist: Json<Vec<ChecklistItem>>,
    pub participation_criteria: Json<Vec<ParticipationCriterion>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AssignmentRow> for AssignmentRecord {
    fn from(row: AssignmentRow) -> Self {
        AssignmentRecord {
            title: row.title,
            description: row.description,
            assignment_type: row.assignment_type,
            grade: row.grade,
            subject: row.subject,
            difficulty_level: row.difficulty_level,
            course: row.course_id,
            created_by: row.created_by,
            is_active: row.is_active,
            questions: row.questions.0,
            answer_key: row.answer_key.0,
            instructions: row.instructions.0,
            rubric: row.rubric.0,
            checklist: row.checklist.0,
            participation_criteria: row.participation_criteria.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_record() -> AssignmentRecord {
        AssignmentRecord {
            title: "Unit 3 Quiz".to_string(),
            description: "Covers photosynthesis".to_string(),
            assignment_type: "multiple_choice_quiz".to_string(),
            grade: "8".to_string(),
            subject: "Biology".to_string(),
            difficulty_level: "medium".to_string(),
            course: Uuid::new_v4(),
            created_by: "teacher@school.edu".to_string(),
            is_active: true,
            questions: vec![],
            answer_key: vec![],
            instructions: vec![],
            rubric: vec![],
            checklist: vec![],
            participation_criteria: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_question(text: &str) -> NewQuestion {
        NewQuestion {
            question: text.to_string(),
            question_type: "multiple_choice".to_string(),
            points: 5.0,
            options: vec![
                "a. Chlorophyll".to_string(),
                "b. Mitochondria".to_string(),
                "c. Ribosome".to_string(),
                "d. Nucleus".to_string(),
            ],
        }
    }

    #[test]
    fn test_sequential_adds_assign_ids_one_then_two() {
        let mut record = empty_record();
        let first = record.add_question(sample_question("Q1"), "a".to_string(), None);
        let second = record.add_question(sample_question("Q2"), "b".to_string(), None);

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(record.questions.len(), 2);
        assert_eq!(record.answer_key.len(), 2);
        assert_eq!(record.answer_key[0].question_id, 1);
        assert_eq!(record.answer_key[1].question_id, 2);
    }

    #[test]
    fn test_delete_removes_exactly_one_pair_and_keeps_other_ids() {
        let mut record = empty_record();
        record.add_question(sample_question("Q1"), "a".to_string(), None);
        record.add_question(sample_question("Q2"), "b".to_string(), None);
        record.add_question(sample_question("Q3"), "c".to_string(), None);

        assert!(record.remove_question(2));

        assert_eq!(record.questions.len(), 2);
        assert_eq!(record.answer_key.len(), 2);
        // No re-compaction: surviving ids are unchanged
        let ids: Vec<i64> = record.questions.iter().map(|q| q.question_id).collect();
        assert_eq!(ids, vec![1, 3]);
        let key_ids: Vec<i64> = record.answer_key.iter().map(|a| a.question_id).collect();
        assert_eq!(key_ids, vec![1, 3]);
    }

    #[test]
    fn test_delete_first_leaves_second_with_original_id() {
        let mut record = empty_record();
        record.add_question(sample_question("Q1"), "a".to_string(), None);
        record.add_question(sample_question("Q2"), "b".to_string(), None);

        assert!(record.remove_question(1));

        assert_eq!(record.questions.len(), 1);
        assert_eq!(record.questions[0].question_id, 2);
        assert_eq!(record.answer_key[0].question_id, 2);
    }

    #[test]
    fn test_delete_missing_id_is_a_noop() {
        let mut record = empty_record();
        record.add_question(sample_question("Q1"), "a".to_string(), None);

        assert!(!record.remove_question(42));
        assert_eq!(record.questions.len(), 1);
        assert_eq!(record.answer_key.len(), 1);
    }

    #[test]
    fn test_add_after_delete_does_not_reuse_surviving_id() {
        let mut record = empty_record();
        record.add_question(sample_question("Q1"), "a".to_string(), None);
        record.add_question(sample_question("Q2"), "b".to_string(), None);
        record.remove_question(1);

        let id = record.add_question(sample_question("Q3"), "c".to_string(), None);
        assert_eq!(id, 3);
    }

    #[test]
    fn test_record_serializes_with_camel_case_collection_keys() {
        let record = empty_record();
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("answerKey").is_some());
        assert!(value.get("participationCriteria").is_some());
        assert!(value.get("answer_key").is_none());
        assert_eq!(value["isActive"], true);
        assert_eq!(value["type"], "multiple_choice_quiz");
    }

    #[test]
    fn test_question_deserializes_legacy_question_text_key() {
        let json = r#"{"questionText": "What is 2+2?", "type": "short_answer", "points": 2}"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.question, "What is 2+2?");
        assert!(question.options.is_empty());
    }
}
