//! Syllabus PDF handling: text extraction and object-storage upload.
//! PDF parsing internals belong to the `pdf-extract` collaborator.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Extracts plain text from PDF bytes. Corrupt or empty files surface as
/// validation errors the client can act on.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        tracing::error!("PDF parsing error: {e}");
        AppError::Validation(
            "Failed to process the PDF file. Please ensure it is not corrupted and try again."
                .to_string(),
        )
    })?;

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract any text from the PDF. The file might be empty or corrupted."
                .to_string(),
        ));
    }

    Ok(text)
}

/// Uploads a syllabus PDF and returns its public URL.
pub async fn upload_syllabus_pdf(
    s3: &S3Client,
    bucket: &str,
    endpoint: &str,
    bytes: Vec<u8>,
) -> Result<String, AppError> {
    let key = format!("syllabi/{}.pdf", Uuid::new_v4());

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(bytes))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Uploaded syllabus PDF to s3://{bucket}/{key}");
    Ok(format!("{endpoint}/{bucket}/{key}"))
}
