pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;
use crate::{assignments, auth, classes, courses};

// Syllabus PDFs can be large; the default 2 MB axum body limit is too small.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/auth/register", post(auth::handlers::handle_register))
        .route("/api/auth/login", post(auth::handlers::handle_login))
        .route("/api/auth/me", get(auth::handlers::handle_me))
        // Assignment API
        .route(
            "/api/assignment/options",
            get(assignments::handlers::handle_options),
        )
        .route(
            "/api/assignment/generate",
            post(assignments::handlers::handle_generate),
        )
        .route("/api/assignment", get(assignments::handlers::handle_list))
        .route(
            "/api/assignment/:id",
            get(assignments::handlers::handle_get).put(assignments::handlers::handle_update),
        )
        .route(
            "/api/assignment/answers/:id",
            get(assignments::handlers::handle_answers),
        )
        .route(
            "/api/assignment/edit/:id",
            get(assignments::handlers::handle_edit),
        )
        .route(
            "/api/assignment/add/:id",
            post(assignments::handlers::handle_add_question),
        )
        .route(
            "/api/assignment/:assignment_id/:collection/:question_id",
            delete(assignments::handlers::handle_delete_item),
        )
        .route(
            "/api/assignment/instructions/:id",
            post(assignments::handlers::handle_add_instructions),
        )
        .route(
            "/api/assignment/rubrics/:id",
            post(assignments::handlers::handle_add_rubric),
        )
        .route(
            "/api/assignment/checklist/:id",
            post(assignments::handlers::handle_add_checklist),
        )
        .route(
            "/api/assignment/participation-criteria/:id",
            post(assignments::handlers::handle_add_participation_criteria),
        )
        // Course API
        .route(
            "/api/course/syllabus/pdf",
            post(courses::handlers::handle_create_with_pdf)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/course/syllabus/ai",
            post(courses::handlers::handle_create_with_ai),
        )
        .route(
            "/api/course/grading-references",
            post(courses::handlers::handle_grading_references),
        )
        .route("/api/course", get(courses::handlers::handle_list))
        .route(
            "/api/course/metadata",
            get(courses::handlers::handle_metadata),
        )
        .route(
            "/api/course/:id",
            get(courses::handlers::handle_get).put(courses::handlers::handle_update),
        )
        .route(
            "/api/course/:course_id/assignments",
            get(courses::handlers::handle_course_assignments),
        )
        // Class API
        .route(
            "/api/class",
            post(classes::handlers::handle_create).get(classes::handlers::handle_list),
        )
        .with_state(state)
}
