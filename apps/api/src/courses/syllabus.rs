//! Syllabus extraction: the same sanitize/coerce pipeline as assignment
//! generation, but against a free-form object shape: the extracted syllabus
//! document has no fixed required field set.

use serde_json::Value;
use tracing::error;

use crate::errors::AppError;
use crate::generation::coerce::coerce_object;
use crate::generation::prompts::{
    GRADING_REFERENCES_PROMPT, STRICT_JSON_SUFFIX, SYLLABUS_EXTRACTION_PROMPT,
};
use crate::generation::sanitize::sanitize;
use crate::llm_client::TextGenerator;

/// Result of a syllabus extraction: the coerced document plus the prompt that
/// produced it, recorded alongside the course for regeneration.
#[derive(Debug)]
pub struct SyllabusExtraction {
    pub document: Value,
    pub prompt: String,
}

/// Extracts a structured syllabus from raw source text (PDF text, or the
/// serialized course details for fully AI-generated syllabi).
pub async fn extract_syllabus(
    llm: &dyn TextGenerator,
    source_text: &str,
) -> Result<SyllabusExtraction, AppError> {
    let prompt = format!("{SYLLABUS_EXTRACTION_PROMPT}{source_text}{STRICT_JSON_SUFFIX}");
    let raw = llm.generate(&prompt).await?;

    let cleaned = sanitize(&raw);
    let mut payload = coerce_object(&cleaned).map_err(|e| {
        error!(
            "First 200 chars of raw AI response: {}",
            raw.chars().take(200).collect::<String>()
        );
        AppError::Format(e)
    })?;

    // References are populated by a separate extraction pass later.
    payload.insert("gradingReferences".to_string(), Value::Array(Vec::new()));

    Ok(SyllabusExtraction {
        document: Value::Object(payload),
        prompt,
    })
}

/// Extracts grading references for an existing course. The returned object
/// is merged into the course's parsed syllabus by the caller.
pub async fn extract_grading_references(
    llm: &dyn TextGenerator,
    request_body: &Value,
) -> Result<Value, AppError> {
    let body_json = serde_json::to_string(request_body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize request: {e}")))?;
    let prompt = format!("{body_json}{STRICT_JSON_SUFFIX}{GRADING_REFERENCES_PROMPT}");

    let raw = llm.generate(&prompt).await?;
    let cleaned = sanitize(&raw);
    let payload = coerce_object(&cleaned).map_err(|e| {
        error!(
            "First 200 chars of raw AI response: {}",
            raw.chars().take(200).collect::<String>()
        );
        AppError::Format(e)
    })?;

    Ok(Value::Object(payload))
}
