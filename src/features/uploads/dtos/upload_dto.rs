use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::uploads::models::DokumentArt;

/// Maximum size per uploaded file (5 MiB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Maximum number of file parts per upload call
pub const MAX_FILES_PER_UPLOAD: usize = 10;

/// Check if a MIME type is allowed: any image type, or PDF
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// Upload request DTO for OpenAPI documentation.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadRequestDto {
    /// The files to upload (up to 10, images or PDF, 5 MiB each)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
    /// Existing correlation id; generated when absent
    #[schema(example = "REQ-20250612-0930")]
    pub anfrage_id: Option<String>,
    /// Document category
    pub dokument_typ: Option<DokumentArt>,
    /// Contact name snapshot
    pub name: Option<String>,
    /// Contact email snapshot
    pub email: Option<String>,
    /// Contact phone snapshot
    pub telefon: Option<String>,
}

/// One successfully stored file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AcceptedFileDto {
    /// Document metadata record id
    pub id: Uuid,
    /// Filename as sent by the client
    pub originalname: String,
    /// Sanitized, timestamp-salted stored filename
    pub filename: String,
    /// Object store key
    pub path: String,
    pub mimetype: String,
    pub size: usize,
}

/// One file excluded from the result, with the reason it was skipped.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectedFileDto {
    pub originalname: String,
    pub reason: String,
}

/// Partial upload result: callers compare `files` against what they sent
/// (or inspect `rejected`) to detect partial failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResultDto {
    pub files: Vec<AcceptedFileDto>,
    pub rejected: Vec<RejectedFileDto>,
    pub anfrage_id: String,
}

/// Response DTO for document deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDocumentResponseDto {
    pub deleted: bool,
}
