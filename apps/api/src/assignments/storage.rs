//! Assignment persistence. Nested collections (questions, answer key,
//! rubric, ...) live in JSONB columns; edit operations are read-modify-write
//! with no optimistic concurrency check; the design assumes single-teacher
//! editing. Callers needing strict consistency must add a version field here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assignment::{AnswerKeyEntry, AssignmentRecord, AssignmentRow};

/// List projection joined with course details; skips the heavy JSONB columns.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub assignment_type: String,
    pub grade: String,
    pub subject: String,
    pub course_id: Uuid,
    pub course_name: String,
    pub created_at: DateTime<Utc>,
}

/// Answer-key-only projection for the grading view.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentAnswersRow {
    pub id: Uuid,
    pub answer_key: Json<Vec<AnswerKeyEntry>>,
}

pub async fn insert_assignment(
    pool: &PgPool,
    record: AssignmentRecord,
) -> Result<AssignmentRow, AppError> {
    let row = sqlx::query_as::<_, AssignmentRow>(
        r#"
        INSERT INTO assignments
            (title, description, type, grade, subject, difficulty_level, course_id,
             created_by, is_active, questions, answer_key, instructions, rubric,
             checklist, participation_criteria, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *
        "#,
    )
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.assignment_type)
    .bind(&record.grade)
    .bind(&record.subject)
    .bind(&record.difficulty_level)
    .bind(record.course)
    .bind(&record.created_by)
    .bind(record.is_active)
    .bind(Json(&record.questions))
    .bind(Json(&record.answer_key))
    .bind(Json(&record.instructions))
    .bind(Json(&record.rubric))
    .bind(Json(&record.checklist))
    .bind(Json(&record.participation_criteria))
    .bind(record.created_at)
    .bind(record.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn fetch_assignment(pool: &PgPool, id: Uuid) -> Result<AssignmentRow, AppError> {
    let row: Option<AssignmentRow> = sqlx::query_as("SELECT * FROM assignments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
}

pub async fn fetch_answer_key(pool: &PgPool, id: Uuid) -> Result<AssignmentAnswersRow, AppError> {
    let row: Option<AssignmentAnswersRow> =
        sqlx::query_as("SELECT id, answer_key FROM assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
}

/// Writes back every editable collection of the aggregate after an edit
/// operation, stamping `updated_at`.
pub async fn save_collections(
    pool: &PgPool,
    id: Uuid,
    record: &AssignmentRecord,
) -> Result<AssignmentRow, AppError> {
    let row = sqlx::query_as::<_, AssignmentRow>(
        r#"
        UPDATE assignments
        SET questions = $2,
            answer_key = $3,
            instructions = $4,
            rubric = $5,
            checklist = $6,
            participation_criteria = $7,
            updated_at = $8
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(Json(&record.questions))
    .bind(Json(&record.answer_key))
    .bind(Json(&record.instructions))
    .bind(Json(&record.rubric))
    .bind(Json(&record.checklist))
    .bind(Json(&record.participation_criteria))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn update_title_description(
    pool: &PgPool,
    id: Uuid,
    title: &str,
    description: &str,
) -> Result<AssignmentRow, AppError> {
    let row: Option<AssignmentRow> = sqlx::query_as(
        r#"
        UPDATE assignments
        SET title = $2, description = $3, updated_at = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
}

/// All active assignments, newest first. Teachers and admins see everything.
pub async fn list_active(pool: &PgPool) -> Result<Vec<AssignmentSummaryRow>, AppError> {
    let rows = sqlx::query_as::<_, AssignmentSummaryRow>(
        r#"
        SELECT a.id, a.title, a.description, a.type, a.grade, a.subject,
               a.course_id, c.course_name, a.created_at
        FROM assignments a
        JOIN courses c ON c.id = a.course_id
        WHERE a.is_active
        ORDER BY a.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Active assignments restricted to courses attached to classes the student
/// is enrolled in.
pub async fn list_active_for_student(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Vec<AssignmentSummaryRow>, AppError> {
    let rows = sqlx::query_as::<_, AssignmentSummaryRow>(
        r#"
        SELECT a.id, a.title, a.description, a.type, a.grade, a.subject,
               a.course_id, c.course_name, a.created_at
        FROM assignments a
        JOIN courses c ON c.id = a.course_id
        WHERE a.is_active
          AND a.course_id IN (
              SELECT unnest(cl.courses) FROM classes cl WHERE $1 = ANY(cl.students)
          )
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_for_course(
    pool: &PgPool,
    course_id: Uuid,
) -> Result<Vec<AssignmentSummaryRow>, AppError> {
    let rows = sqlx::query_as::<_, AssignmentSummaryRow>(
        r#"
        SELECT a.id, a.title, a.description, a.type, a.grade, a.subject,
               a.course_id, c.course_name, a.created_at
        FROM assignments a
        JOIN courses c ON c.id = a.course_id
        WHERE a.course_id = $1
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn course_exists(pool: &PgPool, course_id: Uuid) -> Result<bool, AppError> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
        .bind(course_id)
        .fetch_one(pool)
        .await?;
    Ok(exists.0)
}
