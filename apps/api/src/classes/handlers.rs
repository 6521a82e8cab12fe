use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::class::ClassRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub grade: String,
    pub section: String,
    pub academic_year: String,
    pub subject: String,
    #[serde(default)]
    pub teachers: Vec<Uuid>,
    #[serde(default)]
    pub students: Vec<Uuid>,
}

/// POST /api/class
///
/// A class is unique per (name, grade, section, academic year). Courses with
/// a matching subject and grade are attached at creation time.
pub async fn handle_create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<ClassRow>), AppError> {
    let existing: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id FROM classes
        WHERE name = $1 AND grade = $2 AND section = $3 AND academic_year = $4
        "#,
    )
    .bind(&req.name)
    .bind(&req.grade)
    .bind(&req.section)
    .bind(&req.academic_year)
    .fetch_optional(&state.db)
    .await?;

    if existing.is_some() {
        return Err(AppError::Validation("Class already exists".to_string()));
    }

    let class: ClassRow = sqlx::query_as(
        r#"
        INSERT INTO classes
            (name, description, grade, section, academic_year, subject,
             teachers, students,
             courses)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                COALESCE((SELECT array_agg(id) FROM courses
                          WHERE subject = $6 AND grade = $3), '{}'))
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.grade)
    .bind(&req.section)
    .bind(&req.academic_year)
    .bind(&req.subject)
    .bind(&req.teachers)
    .bind(&req.students)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Created class {} ({} courses attached)",
        class.id,
        class.courses.len()
    );
    Ok((StatusCode::CREATED, Json(class)))
}

/// GET /api/class
pub async fn handle_list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<ClassRow>>, AppError> {
    let classes: Vec<ClassRow> = sqlx::query_as("SELECT * FROM classes ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(classes))
}
