use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::assignments::storage;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::generation::{self, AssignmentKind, GenerateAssignmentRequest};
use crate::models::assignment::{
    AssignmentRecord, AssignmentRow, ChecklistItem, InstructionSection, NewQuestion,
    ParticipationCriterion, RubricCriterion,
};
use crate::models::course::CourseMetadataRow;
use crate::state::AppState;

/// One subject/grade/course option for the generation form.
#[derive(Debug, Serialize)]
pub struct GenerationOption {
    pub subject: String,
    pub grade: String,
    pub course: CourseOption,
}

#[derive(Debug, Serialize)]
pub struct CourseOption {
    pub id: Uuid,
    pub name: String,
}

/// GET /api/assignment/options
pub async fn handle_options(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<GenerationOption>>, AppError> {
    let courses: Vec<CourseMetadataRow> = sqlx::query_as(
        "SELECT id, course_name, subject, grade FROM courses ORDER BY course_name ASC",
    )
    .fetch_all(&state.db)
    .await?;

    let options = courses
        .into_iter()
        .map(|course| GenerationOption {
            subject: course.subject,
            grade: course.grade,
            course: CourseOption {
                id: course.id,
                name: course.course_name,
            },
        })
        .collect();

    Ok(Json(options))
}

/// POST /api/assignment/generate
///
/// Runs the full pipeline (validate → LLM → sanitize → coerce → assemble)
/// and persists the result. Nothing is written if any pipeline step fails.
pub async fn handle_generate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<GenerateAssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentRow>), AppError> {
    if !storage::course_exists(&state.db, request.course).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let record =
        generation::generate_assignment(state.llm.as_ref(), &request, &user.email).await?;
    let row = storage::insert_assignment(&state.db, record).await?;

    info!("Generated assignment {} for course {}", row.id, row.course_id);
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/assignment
/// Students only see assignments of courses attached to classes they are
/// enrolled in; teachers and admins see all active assignments.
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<storage::AssignmentSummaryRow>>, AppError> {
    let rows = if user.is_student() {
        storage::list_active_for_student(&state.db, user.id).await?
    } else {
        storage::list_active(&state.db).await?
    };
    Ok(Json(rows))
}

/// GET /api/assignment/:id
pub async fn handle_get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AssignmentRow>, AppError> {
    Ok(Json(storage::fetch_assignment(&state.db, id).await?))
}

/// GET /api/assignment/answers/:id
pub async fn handle_answers(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<storage::AssignmentAnswersRow>, AppError> {
    Ok(Json(storage::fetch_answer_key(&state.db, id).await?))
}

/// GET /api/assignment/edit/:id
/// Full aggregate for the edit view, answer key included.
pub async fn handle_edit(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AssignmentRow>, AppError> {
    Ok(Json(storage::fetch_assignment(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddQuestionRequest {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub points: f64,
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: String,
}

/// POST /api/assignment/add/:id
///
/// Appends a question under the next sequential id with its paired
/// answer-key entry. Only question-bearing kinds accept manual questions.
pub async fn handle_add_question(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddQuestionRequest>,
) -> Result<Json<AssignmentRow>, AppError> {
    let row = storage::fetch_assignment(&state.db, id).await?;
    let mut record = AssignmentRecord::from(row);

    let kind = AssignmentKind::from_type_token(&record.assignment_type)
        .filter(AssignmentKind::is_question_bearing)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Questions cannot be added to '{}' assignments",
                record.assignment_type
            ))
        })?;

    let (new_question, key, value) = match kind {
        AssignmentKind::MultipleChoice => {
            // Answers arrive as "a. Paris": the option letter, then the text.
            let (key, value) = match req.answer.split_once('.') {
                Some((k, v)) => (k.trim().to_string(), Some(v.trim().to_string())),
                None => (req.answer.trim().to_string(), None),
            };
            (
                NewQuestion {
                    question: req.question,
                    question_type: req
                        .question_type
                        .strip_suffix("_quiz")
                        .unwrap_or(&req.question_type)
                        .to_string(),
                    points: req.points,
                    options: req.options,
                },
                key,
                value,
            )
        }
        _ => (
            NewQuestion {
                question: req.question,
                question_type: req.question_type,
                points: req.points,
                options: Vec::new(),
            },
            req.answer.clone(),
            Some(req.answer),
        ),
    };

    let question_id = record.add_question(new_question, key, value);
    info!("Added question {question_id} to assignment {id}");

    Ok(Json(storage::save_collections(&state.db, id, &record).await?))
}

/// DELETE /api/assignment/:assignment_id/:collection/:question_id
///
/// Deletes a question and its answer-key entry by shared `questionId`,
/// never by positional index, so prior deletions cannot cause misalignment.
pub async fn handle_delete_item(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((assignment_id, collection, question_id)): Path<(Uuid, String, i64)>,
) -> Result<Json<AssignmentRow>, AppError> {
    if collection != "questions" {
        return Err(AppError::Validation(format!(
            "Unsupported collection '{collection}'"
        )));
    }

    let row = storage::fetch_assignment(&state.db, assignment_id).await?;
    let mut record = AssignmentRecord::from(row);

    if !record.remove_question(question_id) {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    info!("Deleted question {question_id} from assignment {assignment_id}");
    Ok(Json(
        storage::save_collections(&state.db, assignment_id, &record).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub title: String,
    pub description: String,
}

/// PUT /api/assignment/:id
pub async fn handle_update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAssignmentRequest>,
) -> Result<Json<AssignmentRow>, AppError> {
    Ok(Json(
        storage::update_title_description(&state.db, id, &req.title, &req.description).await?,
    ))
}

/// POST /api/assignment/instructions/:id
pub async fn handle_add_instructions(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(section): Json<InstructionSection>,
) -> Result<Json<AssignmentRow>, AppError> {
    let row = storage::fetch_assignment(&state.db, id).await?;
    let mut record = AssignmentRecord::from(row);
    record.add_instruction_section(section);
    Ok(Json(storage::save_collections(&state.db, id, &record).await?))
}

/// POST /api/assignment/rubrics/:id
pub async fn handle_add_rubric(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(criterion): Json<RubricCriterion>,
) -> Result<Json<AssignmentRow>, AppError> {
    let row = storage::fetch_assignment(&state.db, id).await?;
    let mut record = AssignmentRecord::from(row);
    record.add_rubric_criterion(criterion);
    Ok(Json(storage::save_collections(&state.db, id, &record).await?))
}

/// POST /api/assignment/checklist/:id
pub async fn handle_add_checklist(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(item): Json<ChecklistItem>,
) -> Result<Json<AssignmentRow>, AppError> {
    let row = storage::fetch_assignment(&state.db, id).await?;
    let mut record = AssignmentRecord::from(row);
    record.add_checklist_item(item);
    Ok(Json(storage::save_collections(&state.db, id, &record).await?))
}

/// POST /api/assignment/participation-criteria/:id
pub async fn handle_add_participation_criteria(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(criterion): Json<ParticipationCriterion>,
) -> Result<Json<AssignmentRow>, AppError> {
    let row = storage::fetch_assignment(&state.db, id).await?;
    let mut record = AssignmentRecord::from(row);
    record.add_participation_criterion(criterion);
    Ok(Json(storage::save_collections(&state.db, id, &record).await?))
}
