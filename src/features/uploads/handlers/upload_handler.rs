use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::uploads::dtos::{
    DeleteDocumentResponseDto, UploadRequestDto, UploadResultDto, MAX_FILES_PER_UPLOAD,
};
use crate::features::uploads::models::DokumentArt;
use crate::features::uploads::services::{IncomingFile, UploadMetadata, UploadService};
use crate::shared::types::ApiResponse;

/// Upload intake documents
///
/// Accepts multipart/form-data with:
/// - `files`: up to 10 file parts (images or PDF, 5 MiB each)
/// - `anfrageId`: existing correlation id (optional, generated when absent)
/// - `dokumentTyp`: BUSSGELD | KFZGUTACHTEN | VERKEHRSUNFALL (optional)
/// - `name`, `email`, `telefon`: contact snapshot (optional)
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "uploads",
    request_body(
        content = UploadRequestDto,
        content_type = "multipart/form-data",
        description = "Multipart upload with optional correlation id and contact fields",
    ),
    responses(
        (status = 200, description = "Files uploaded (possibly partially)", body = ApiResponse<UploadResultDto>),
        (status = 400, description = "Invalid multipart data or no files"),
        (status = 500, description = "Every file in the batch failed")
    )
)]
pub async fn upload_files(
    State(service): State<Arc<UploadService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResultDto>>, AppError> {
    let mut files: Vec<IncomingFile> = Vec::new();
    let mut metadata = UploadMetadata::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "files" => {
                // Part-count limit is checked before reading the part body
                // so oversized batches fail the whole call up front.
                if files.len() >= MAX_FILES_PER_UPLOAD {
                    return Err(AppError::BadRequest(format!(
                        "Too many files. Maximum is {} per upload",
                        MAX_FILES_PER_UPLOAD
                    )));
                }

                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let original_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                files.push(IncomingFile {
                    original_name,
                    content_type,
                    bytes: data.to_vec(),
                });
            }
            "anfrageId" => {
                let text = read_text_field(field, "anfrageId").await?;
                if !text.is_empty() {
                    metadata.anfrage_id = Some(text);
                }
            }
            "dokumentTyp" => {
                let text = read_text_field(field, "dokumentTyp").await?;
                if !text.is_empty() {
                    metadata.dokument_typ = Some(text.parse::<DokumentArt>().map_err(|_| {
                        AppError::BadRequest(format!("Unknown dokumentTyp '{}'", text))
                    })?);
                }
            }
            "name" => {
                let text = read_text_field(field, "name").await?;
                if !text.is_empty() {
                    metadata.kontakt_name = Some(text);
                }
            }
            "email" => {
                let text = read_text_field(field, "email").await?;
                if !text.is_empty() {
                    metadata.kontakt_email = Some(text);
                }
            }
            "telefon" => {
                let text = read_text_field(field, "telefon").await?;
                if !text.is_empty() {
                    metadata.kontakt_telefon = Some(text);
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let result = service.upload_files(files, metadata).await?;

    Ok(Json(ApiResponse::success(Some(result), None, None)))
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

/// Delete an uploaded document and its stored blob
#[utoipa::path(
    delete,
    path = "/api/upload/{fileId}",
    tag = "uploads",
    params(
        ("fileId" = Uuid, Path, description = "Document metadata record id")
    ),
    responses(
        (status = 200, description = "Document deleted", body = ApiResponse<DeleteDocumentResponseDto>),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_document(
    State(service): State<Arc<UploadService>>,
    Path(file_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<DeleteDocumentResponseDto>>), AppError> {
    service.delete_document(file_id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            Some(DeleteDocumentResponseDto { deleted: true }),
            Some("Document deleted successfully".to_string()),
            None,
        )),
    ))
}
