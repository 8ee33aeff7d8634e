use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, post},
    Router,
};
use std::sync::Arc;

use crate::features::uploads::dtos::{MAX_FILES_PER_UPLOAD, MAX_FILE_SIZE};
use crate::features::uploads::handlers::{delete_document, upload_files};
use crate::features::uploads::services::UploadService;

/// Create routes for the uploads feature
pub fn routes(upload_service: Arc<UploadService>) -> Router {
    Router::new()
        .route(
            "/api/upload",
            // Body limit covers a full batch plus multipart overhead
            post(upload_files).layer(DefaultBodyLimit::max(
                MAX_FILE_SIZE * MAX_FILES_PER_UPLOAD + 1024 * 1024,
            )),
        )
        .route("/api/upload/{fileId}", delete(delete_document))
        .with_state(upload_service)
}
