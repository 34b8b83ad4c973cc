use axum::{
    extract::{multipart::Field, rejection::JsonRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::types::{AnalysisRequest, AnalysisResult};
use crate::state::AppState;

/// Upload body cap for `/analyze/upload`.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// POST /analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let result = state.orchestrator.analyze(&request).await?;
    Ok(Json(result))
}

/// POST /analyze/upload
///
/// Multipart form: `file` (PDF or plain text, required), `target_role` and
/// `roadmap_months` (optional).
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut resume_text: Option<String> = None;
    let mut target_role: Option<String> = None;
    let mut roadmap_months: Option<u8> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => resume_text = Some(read_resume_file(field).await?),
            "target_role" => target_role = Some(read_text_field(field).await?),
            "roadmap_months" => {
                let raw = read_text_field(field).await?;
                let months = raw.trim().parse::<u8>().map_err(|_| {
                    AppError::Validation(format!("roadmap_months must be an integer (got {raw:?})"))
                })?;
                roadmap_months = Some(months);
            }
            _ => {}
        }
    }

    let resume_text =
        resume_text.ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;

    let mut request = AnalysisRequest::new(resume_text);
    if let Some(role) = target_role {
        request = request.with_target_role(role);
    }
    if let Some(months) = roadmap_months {
        request = request.with_roadmap_months(months);
    }

    let result = state.orchestrator.analyze(&request).await?;
    Ok(Json(result))
}

async fn read_text_field(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Could not read form field: {e}")))
}

#[derive(Debug, PartialEq)]
enum UploadKind {
    Pdf,
    Text,
}

fn classify_upload(content_type: Option<&str>, file_name: Option<&str>, data: &[u8]) -> Option<UploadKind> {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
    let file_name = file_name.unwrap_or_default().to_ascii_lowercase();

    if content_type == "application/pdf" || file_name.ends_with(".pdf") || data.starts_with(b"%PDF") {
        Some(UploadKind::Pdf)
    } else if content_type.starts_with("text/")
        || file_name.ends_with(".txt")
        || file_name.ends_with(".md")
    {
        Some(UploadKind::Text)
    } else {
        None
    }
}

async fn read_resume_file(field: Field<'_>) -> Result<String, AppError> {
    let content_type = field.content_type().map(str::to_string);
    let file_name = field.file_name().map(str::to_string);
    let data: Bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Could not read uploaded file: {e}")))?;

    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    let kind = classify_upload(content_type.as_deref(), file_name.as_deref(), &data)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unsupported file type {:?}; upload a PDF or plain text resume",
                content_type.as_deref().unwrap_or("unknown")
            ))
        })?;

    info!(
        file_name = file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = data.len(),
        kind = ?kind,
        "Received resume upload"
    );

    match kind {
        UploadKind::Text => String::from_utf8(data.to_vec())
            .map_err(|_| AppError::BadRequest("Text upload is not valid UTF-8".to_string())),
        // PDF text extraction is CPU-bound.
        UploadKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data).map_err(|e| e.to_string())
        })
        .await
        // pdf-extract panics on some malformed documents; treat that as unreadable.
        .map_err(|e| AppError::Validation(format!("Could not extract text from PDF: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not extract text from PDF: {e}"))),
    }
}
