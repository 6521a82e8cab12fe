use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json as SqlJson;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::assignments::storage::{self, AssignmentSummaryRow};
use crate::auth::AuthUser;
use crate::courses::syllabus::{extract_grading_references, extract_syllabus};
use crate::courses::upload::{extract_pdf_text, upload_syllabus_pdf};
use crate::errors::AppError;
use crate::models::course::{AiMetadata, CourseMetadataRow, CourseRow};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    pub course_name: String,
    pub subject: String,
    pub grade: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseAiRequest {
    pub course_details: CourseDetails,
    #[serde(default)]
    pub prompt: String,
    /// Reference books and other supporting material titles.
    #[serde(default)]
    pub additional_info: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub class_id: Uuid,
    pub class_name: String,
    pub students: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentSummary {
    pub total_students: i64,
    pub total_assignments: i64,
    pub classes: Vec<ClassSummary>,
}

#[derive(Debug, Serialize)]
pub struct CourseWithEnrollment {
    #[serde(flatten)]
    pub course: CourseRow,
    pub enrollment: EnrollmentSummary,
}

#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseRow,
    pub enrollment: EnrollmentSummary,
    pub assignments: Vec<AssignmentSummaryRow>,
}

/// POST /api/course/syllabus/pdf
///
/// Multipart upload: a `details` JSON field plus the syllabus PDF. The PDF
/// is stored in object storage and its text fed through the extraction
/// pipeline; the course is only created if extraction succeeds.
pub async fn handle_create_with_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CourseRow>), AppError> {
    let mut details: Option<CourseDetails> = None;
    let mut pdf_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("details") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid details field: {e}")))?;
                details = Some(serde_json::from_str(&text).map_err(|e| {
                    AppError::Validation(format!("Invalid course details: {e}"))
                })?);
            }
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                if !content_type.as_deref().is_some_and(|ct| ct.contains("pdf")) {
                    return Err(AppError::Validation(
                        "Only PDF files are allowed".to_string(),
                    ));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file field: {e}")))?;
                pdf_bytes = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let details =
        details.ok_or_else(|| AppError::Validation("Course details are required".to_string()))?;
    let pdf_bytes =
        pdf_bytes.ok_or_else(|| AppError::Validation("Syllabus PDF is required".to_string()))?;

    let pdf_text = extract_pdf_text(&pdf_bytes)?;
    let pdf_url = upload_syllabus_pdf(
        &state.s3,
        &state.config.s3_bucket,
        &state.config.s3_endpoint,
        pdf_bytes,
    )
    .await?;

    let details_json = serde_json::to_string(&details)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize details: {e}")))?;
    let extraction =
        extract_syllabus(state.llm.as_ref(), &format!("{pdf_text}\n{details_json}")).await?;

    let course = insert_course(
        &state.db,
        &details,
        &user.email,
        Some(pdf_url),
        extraction.document,
        AiMetadata {
            prompt: extraction.prompt,
            reference_books: Vec::new(),
            generated_syllabus: Value::Null,
        },
    )
    .await?;

    let attached = attach_course_to_matching_classes(&state.db, &course).await?;
    info!("Created course {} (attached to {attached} classes)", course.id);

    Ok((StatusCode::CREATED, Json(course)))
}

/// POST /api/course/syllabus/ai
/// Creates a course whose syllabus is generated from the form details alone.
pub async fn handle_create_with_ai(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateCourseAiRequest>,
) -> Result<(StatusCode, Json<CourseRow>), AppError> {
    let source = serde_json::to_string(&serde_json::json!({
        "courseDetails": req.course_details,
        "prompt": req.prompt,
        "additionalInfo": req.additional_info,
    }))
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize request: {e}")))?;

    let extraction = extract_syllabus(state.llm.as_ref(), &source).await?;

    let course = insert_course(
        &state.db,
        &req.course_details,
        &user.email,
        None,
        extraction.document,
        AiMetadata {
            prompt: format!("{}{}", req.prompt, extraction.prompt),
            reference_books: req.additional_info,
            generated_syllabus: Value::Null,
        },
    )
    .await?;

    let attached = attach_course_to_matching_classes(&state.db, &course).await?;
    info!("Created course {} (attached to {attached} classes)", course.id);

    Ok((StatusCode::CREATED, Json(course)))
}

#[derive(Debug, Deserialize)]
pub struct GradingReferencesRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub context: serde_json::Map<String, Value>,
}

/// POST /api/course/grading-references
/// Generates grading references and merges them into the course's parsed
/// syllabus document.
pub async fn handle_grading_references(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<GradingReferencesRequest>,
) -> Result<Json<CourseRow>, AppError> {
    let course = fetch_course(&state.db, req.id).await?;

    let references =
        extract_grading_references(state.llm.as_ref(), &Value::Object(req.context)).await?;

    let mut syllabus = course.parsed_syllabus.0.clone();
    match (&mut syllabus, references) {
        (Value::Object(base), Value::Object(extra)) => {
            for (key, value) in extra {
                base.insert(key, value);
            }
        }
        (slot, other) => *slot = other,
    }

    let updated: CourseRow = sqlx::query_as(
        r#"
        UPDATE courses
        SET parsed_syllabus = $2, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(req.id)
    .bind(SqlJson(&syllabus))
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// GET /api/course
pub async fn handle_list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<CourseWithEnrollment>>, AppError> {
    let courses: Vec<CourseRow> =
        sqlx::query_as("SELECT * FROM courses ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;

    let mut result = Vec::with_capacity(courses.len());
    for course in courses {
        let enrollment = enrollment_summary(&state.db, &course).await?;
        result.push(CourseWithEnrollment { course, enrollment });
    }

    Ok(Json(result))
}

/// GET /api/course/metadata
pub async fn handle_metadata(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<CourseMetadataRow>>, AppError> {
    let rows: Vec<CourseMetadataRow> = sqlx::query_as(
        "SELECT id, course_name, subject, grade FROM courses ORDER BY course_name ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/course/:id
pub async fn handle_get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseDetailResponse>, AppError> {
    let course = fetch_course(&state.db, id).await?;
    let enrollment = enrollment_summary(&state.db, &course).await?;
    let assignments = storage::list_for_course(&state.db, id).await?;

    Ok(Json(CourseDetailResponse {
        course,
        enrollment,
        assignments,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub course_name: Option<String>,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

/// PUT /api/course/:id
pub async fn handle_update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<CourseRow>, AppError> {
    let updated: Option<CourseRow> = sqlx::query_as(
        r#"
        UPDATE courses
        SET course_name = COALESCE($2, course_name),
            subject = COALESCE($3, subject),
            grade = COALESCE($4, grade),
            description = COALESCE($5, description),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.course_name)
    .bind(req.subject)
    .bind(req.grade)
    .bind(req.description)
    .fetch_optional(&state.db)
    .await?;

    updated
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}

/// GET /api/course/:course_id/assignments
pub async fn handle_course_assignments(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<AssignmentSummaryRow>>, AppError> {
    if !storage::course_exists(&state.db, course_id).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }
    Ok(Json(storage::list_for_course(&state.db, course_id).await?))
}

async fn fetch_course(pool: &PgPool, id: Uuid) -> Result<CourseRow, AppError> {
    let course: Option<CourseRow> = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    course.ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}

async fn insert_course(
    pool: &PgPool,
    details: &CourseDetails,
    created_by: &str,
    syllabus_pdf_url: Option<String>,
    parsed_syllabus: Value,
    ai_metadata: AiMetadata,
) -> Result<CourseRow, AppError> {
    let course: CourseRow = sqlx::query_as(
        r#"
        INSERT INTO courses
            (course_name, subject, grade, description, created_by,
             syllabus_pdf_url, parsed_syllabus, ai_metadata)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&details.course_name)
    .bind(&details.subject)
    .bind(&details.grade)
    .bind(&details.description)
    .bind(created_by)
    .bind(syllabus_pdf_url)
    .bind(SqlJson(&parsed_syllabus))
    .bind(SqlJson(&ai_metadata))
    .fetch_one(pool)
    .await?;

    Ok(course)
}

/// New courses are attached to every class with matching subject and grade.
async fn attach_course_to_matching_classes(
    pool: &PgPool,
    course: &CourseRow,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE classes
        SET courses = array_append(courses, $1), updated_at = now()
        WHERE subject = $2 AND grade = $3 AND NOT ($1 = ANY(courses))
        "#,
    )
    .bind(course.id)
    .bind(&course.subject)
    .bind(&course.grade)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

#[derive(Debug, FromRow)]
struct ClassEnrollmentRow {
    id: Uuid,
    name: String,
    student_count: i64,
}

async fn enrollment_summary(
    pool: &PgPool,
    course: &CourseRow,
) -> Result<EnrollmentSummary, AppError> {
    let classes: Vec<ClassEnrollmentRow> = sqlx::query_as(
        r#"
        SELECT id, name, COALESCE(cardinality(students), 0)::bigint AS student_count
        FROM classes
        WHERE subject = $1 AND grade = $2
        "#,
    )
    .bind(&course.subject)
    .bind(&course.grade)
    .fetch_all(pool)
    .await?;

    let total_assignments: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM assignments WHERE course_id = $1 AND is_active",
    )
    .bind(course.id)
    .fetch_one(pool)
    .await?;

    let total_students = classes.iter().map(|c| c.student_count).sum();
    Ok(EnrollmentSummary {
        total_students,
        total_assignments: total_assignments.0,
        classes: classes
            .into_iter()
            .map(|c| ClassSummary {
                class_id: c.id,
                class_name: c.name,
                students: c.student_count,
            })
            .collect(),
    })
}
