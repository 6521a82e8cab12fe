use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata about the AI call that produced a course's syllabus, kept for
/// operator debugging and regeneration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMetadata {
    pub prompt: String,
    #[serde(default)]
    pub reference_books: Vec<String>,
    #[serde(default)]
    pub generated_syllabus: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseRow {
    pub id: Uuid,
    pub course_name: String,
    pub subject: String,
    pub grade: String,
    pub description: String,
    pub created_by: String,
    pub syllabus_pdf_url: Option<String>,
    /// Free-form extracted syllabus document; shape is model-driven.
    pub parsed_syllabus: Json<serde_json::Value>,
    pub ai_metadata: Json<AiMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight projection for dropdowns and the generation form.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseMetadataRow {
    pub id: Uuid,
    pub course_name: String,
    pub subject: String,
    pub grade: String,
}
