//! Assignment generation: orchestrates the content pipeline.
//!
//! Flow: validate input → prompt template → LLM call → sanitize → coerce →
//! assemble. The transformation steps are synchronous and side-effect-free;
//! the LLM call is the only suspension point, and if it fails the pipeline
//! aborts before coercion so partial records are never produced.

pub mod assemble;
pub mod coerce;
pub mod prompts;
pub mod sanitize;

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::assignment::AssignmentRecord;

/// The expected shape of a generated assignment, one variant per supported
/// question-type family. Replaces the loose "push whatever fields arrive"
/// handling with a single dispatch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    MultipleChoice,
    ShortAnswer,
    Essay,
    Discussion,
    CaseStudy,
}

impl AssignmentKind {
    /// Resolves a kind from a snake-cased type token such as
    /// `multiple_choice_test` or `short_answer_test`.
    pub fn from_type_token(token: &str) -> Option<Self> {
        if token.contains("multiple_choice") {
            Some(AssignmentKind::MultipleChoice)
        } else if token.contains("short_answer") {
            Some(AssignmentKind::ShortAnswer)
        } else if token.contains("essay") {
            Some(AssignmentKind::Essay)
        } else if token.contains("discussion") {
            Some(AssignmentKind::Discussion)
        } else if token.contains("case_study") {
            Some(AssignmentKind::CaseStudy)
        } else {
            None
        }
    }

    /// Resolves a kind from a question-type title such as
    /// "Multiple Choice Test".
    pub fn from_title(title: &str) -> Option<Self> {
        Self::from_type_token(&snake_case(title))
    }

    /// Top-level fields the model response must carry for this kind.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            AssignmentKind::MultipleChoice
            | AssignmentKind::ShortAnswer
            | AssignmentKind::CaseStudy => &["questions", "answer_key"],
            AssignmentKind::Essay => &["rubric"],
            AssignmentKind::Discussion => &["participation_criteria"],
        }
    }

    /// Whether assignments of this kind carry a question/answer-key pair.
    pub fn is_question_bearing(&self) -> bool {
        matches!(
            self,
            AssignmentKind::MultipleChoice
                | AssignmentKind::ShortAnswer
                | AssignmentKind::CaseStudy
        )
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssignmentKind::MultipleChoice => "multiple-choice",
            AssignmentKind::ShortAnswer => "short-answer",
            AssignmentKind::Essay => "essay",
            AssignmentKind::Discussion => "discussion",
            AssignmentKind::CaseStudy => "case-study",
        };
        f.write_str(name)
    }
}

/// Converts a question-type title to the persisted type token:
/// "Multiple Choice Test" → "multiple_choice_test".
pub fn snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_numeric()) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(c);
    }
    out.trim_end_matches('_').to_string()
}

/// Question-type configuration as submitted by the generation form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTypeConfig {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Output sections the prompt should request (e.g. "rubric", "checklist").
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// Request body for assignment generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAssignmentRequest {
    pub title: String,
    pub description: String,
    pub course: Uuid,
    pub grade: String,
    pub subject: String,
    pub difficulty: String,
    pub question_type: QuestionTypeConfig,
    #[serde(default)]
    pub number_of_questions: Option<u32>,
}

/// Validates caller input before any LLM call is made. Returns the resolved
/// assignment kind so the pipeline validates the response against it.
pub fn validate_input(input: &GenerateAssignmentRequest) -> Result<AssignmentKind, AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if input.grade.trim().is_empty() {
        return Err(AppError::Validation("Grade is required".to_string()));
    }
    if input.question_type.title.trim().is_empty() {
        return Err(AppError::Validation(
            "Question type configuration is required".to_string(),
        ));
    }

    let kind = AssignmentKind::from_title(&input.question_type.title).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported question type '{}'",
            input.question_type.title
        ))
    })?;

    if matches!(
        kind,
        AssignmentKind::MultipleChoice | AssignmentKind::ShortAnswer
    ) && input.number_of_questions.unwrap_or(0) < 1
    {
        return Err(AppError::Validation(
            "Number of questions is required for this test type".to_string(),
        ));
    }

    Ok(kind)
}

/// Runs the generation pipeline: sanitize → coerce → assemble.
/// Persistence is the caller's concern.
pub async fn generate_assignment(
    llm: &dyn TextGenerator,
    request: &GenerateAssignmentRequest,
    created_by: &str,
) -> Result<AssignmentRecord, AppError> {
    let kind = validate_input(request)?;

    let prompt = prompts::build_assignment_prompt(request)?;
    let raw = llm.generate(&prompt).await?;

    let cleaned = sanitize::sanitize(&raw);
    let payload = coerce::coerce(&cleaned, kind).map_err(|e| {
        error!(
            "First 200 chars of raw AI response: {}",
            raw.chars().take(200).collect::<String>()
        );
        AppError::Format(e)
    })?;

    let record = assemble::assemble(payload, request, kind, created_by, Utc::now());
    info!(
        "Assembled {} assignment '{}' with {} questions",
        record.assignment_type,
        record.title,
        record.questions.len()
    );
    Ok(record)
}
