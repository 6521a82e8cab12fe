use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum
/// extractors. The LLM client sits behind a trait object so handlers and the
/// generation pipeline can be exercised with stubs.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
}
