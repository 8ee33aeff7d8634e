use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::contact::dtos::FaqContactDto;
use crate::features::contact::services::ContactService;
use crate::shared::types::ApiResponse;

/// Forward a FAQ contact message to the operations mailbox
#[utoipa::path(
    post,
    path = "/api/faq-contact",
    tag = "contact",
    request_body = FaqContactDto,
    responses(
        (status = 200, description = "Message forwarded, confirmation mail sent"),
        (status = 400, description = "Missing or invalid form fields")
    )
)]
pub async fn faq_contact(
    State(service): State<Arc<ContactService>>,
    AppJson(dto): AppJson<FaqContactDto>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.send_faq_contact(dto).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Nachricht gesendet".to_string()),
        None,
    )))
}
