use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClassRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub grade: String,
    pub section: String,
    pub academic_year: String,
    pub subject: String,
    pub teachers: Vec<Uuid>,
    pub students: Vec<Uuid>,
    pub courses: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
