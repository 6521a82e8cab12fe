//! Prompt templates for assignment generation, syllabus extraction, and
//! grading-reference extraction.
//!
//! Every template instructs the model to return strict JSON; the sanitizer
//! and coercer downstream assume nothing and clean up anyway.

use crate::errors::AppError;
use crate::generation::GenerateAssignmentRequest;

/// Appended to the serialized generation request.
pub const ASSIGNMENT_PROMPT: &str = r#"
## Assignment Generation

Using the request object above, generate the assignment content as a single
JSON object. Respond with the JSON object ONLY: no prose,
no markdown code fences, no explanations before or after.

### Output object:

- "questions": array of question objects:
  - "question": the question text
  - "type": the question type token (e.g. "multiple_choice", "short_answer")
  - "points": a non-negative number
  - "options": for multiple choice, exactly 4 strings labelled "a." to "d.";
    for every other type, an empty array
- "answer_key": array with exactly one entry per question, in the same order:
  - "key": for multiple choice the correct option letter (a, b, c or d);
    otherwise the expected answer
  - "value": for multiple choice the correct option text; otherwise additional
    context for the grader
- "rubric": array of {"criterion", "points", "description"} objects, when the
  requested outputs include a rubric
- "checklist": array of {"item", "required"} objects, when requested
- "instructions": array of {"title", "content"} sections, when requested
- "participation_criteria": array of {"description", "points"} objects, when
  requested

Generate exactly the number of questions requested. Match the requested grade
level, subject and difficulty. Omitted optional sections may be empty arrays
but must not contain placeholder text.
"#;

/// Syllabus extraction instructions. The syllabus text (or the course details
/// for fully AI-generated syllabi) is appended after the template.
pub const SYLLABUS_EXTRACTION_PROMPT: &str = r#"
## Syllabus Data Extraction

Extract the following information from the provided syllabus text into a
single JSON object. If information for any field is not available, use
reasonable placeholder text or generate the missing information.

### Required fields (all camelCase):

1. "courseTitle": the full course title.
2. "instructor": the instructor's name and title.
3. "term": the academic term (e.g. "Fall 2023").
4. "courseDescription": the full course description paragraph.
5. "learningObjectives": all learning objectives as an array of strings.
6. "requiredMaterials": array of objects with "title", "author", "publisher",
   "year" and a boolean "required".
7. "gradingPolicy": object keyed by assessment component ("assignments",
   "participation", "midterm", "finalExam", plus any others found), each a
   {"percentage", "description"} object.
8. "weeklySchedule": array of {"week", "topic", "readings", "assignments"}.
9. "policies": object with "attendance", "lateWork", "academicIntegrity" and
   "accommodations".

Respond with strictly valid JSON and nothing else.

### Syllabus text:
"#;

/// Grading-reference extraction instructions, applied to an existing course's
/// syllabus. Produces resources that support the course's assessments.
pub const GRADING_REFERENCES_PROMPT: &str = r#"
## Grading References Extraction

Analyze the provided course syllabus and extract a structured list of grading
references: documents, links or texts that support the course's learning
objectives, assignments and assessments (style guides, rubric templates,
citation examples, external writing resources).

Respond with a single JSON object containing one key, "gradingReferences",
whose value is an array of objects with these properties:

- "id": unique identifier as a string ("1", "2", ...)
- "title": the title of the resource
- "type": "Document", "Link" or "Text"
- "added": the date added, formatted "MMM DD, YYYY"
- "usedIn": how many assignments use the resource (e.g. "3 assignments")
- "url": the resource URL if available, otherwise an empty string

If a property is not explicitly available, use a reasonable estimate. Respond
with strictly valid JSON and nothing else.

### Syllabus:
"#;

/// Reminder suffix for the syllabus pipelines.
pub const STRICT_JSON_SUFFIX: &str =
    " Make sure the required fields are in camelCase format and the output is strictly valid JSON.";

/// Builds the assignment-generation prompt: the serialized request followed
/// by the generation instructions.
pub fn build_assignment_prompt(request: &GenerateAssignmentRequest) -> Result<String, AppError> {
    let input_json = serde_json::to_string(request)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize request: {e}")))?;
    Ok(format!("{input_json}{ASSIGNMENT_PROMPT}"))
}
