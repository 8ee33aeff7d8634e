use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::requests::dtos::{
    AnfrageResponseDto, SubmitAnfrageDto, SubmitResultDto, UpdateAnfrageDto,
};
use crate::features::requests::models::AnfrageTyp;
use crate::features::requests::services::AnfrageService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Submit a fine dispute request
#[utoipa::path(
    post,
    path = "/api/anfrage/bussgeld",
    tag = "anfragen",
    request_body = SubmitAnfrageDto,
    responses(
        (status = 200, description = "Request stored, notifications queued", body = ApiResponse<SubmitResultDto>),
        (status = 400, description = "Missing contact data or consents")
    )
)]
pub async fn submit_bussgeld(
    State(service): State<Arc<AnfrageService>>,
    AppJson(dto): AppJson<SubmitAnfrageDto>,
) -> Result<Json<ApiResponse<SubmitResultDto>>, AppError> {
    submit(service, AnfrageTyp::Bussgeld, dto).await
}

/// Submit a traffic accident request
#[utoipa::path(
    post,
    path = "/api/anfrage/verkehrsunfall",
    tag = "anfragen",
    request_body = SubmitAnfrageDto,
    responses(
        (status = 200, description = "Request stored, notifications queued", body = ApiResponse<SubmitResultDto>),
        (status = 400, description = "Missing contact data or consents")
    )
)]
pub async fn submit_verkehrsunfall(
    State(service): State<Arc<AnfrageService>>,
    AppJson(dto): AppJson<SubmitAnfrageDto>,
) -> Result<Json<ApiResponse<SubmitResultDto>>, AppError> {
    submit(service, AnfrageTyp::Verkehrsunfall, dto).await
}

/// Submit a vehicle damage assessment request
#[utoipa::path(
    post,
    path = "/api/anfrage/kfz-gutachten",
    tag = "anfragen",
    request_body = SubmitAnfrageDto,
    responses(
        (status = 200, description = "Request stored, notifications queued", body = ApiResponse<SubmitResultDto>),
        (status = 400, description = "Missing contact data")
    )
)]
pub async fn submit_kfz_gutachten(
    State(service): State<Arc<AnfrageService>>,
    AppJson(dto): AppJson<SubmitAnfrageDto>,
) -> Result<Json<ApiResponse<SubmitResultDto>>, AppError> {
    submit(service, AnfrageTyp::KfzGutachten, dto).await
}

async fn submit(
    service: Arc<AnfrageService>,
    typ: AnfrageTyp,
    dto: SubmitAnfrageDto,
) -> Result<Json<ApiResponse<SubmitResultDto>>, AppError> {
    let anfrage = service.submit(typ, dto).await?;

    Ok(Json(ApiResponse::success(
        Some(SubmitResultDto {
            anfrage_id: anfrage.id,
        }),
        Some("Anfrage erfolgreich übermittelt".to_string()),
        None,
    )))
}

/// List intake requests
#[utoipa::path(
    get,
    path = "/api/anfrage",
    tag = "anfragen",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Paginated list of requests", body = ApiResponse<Vec<AnfrageResponseDto>>),
        (status = 401, description = "Missing or invalid credentials")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_anfragen(
    State(service): State<Arc<AnfrageService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AnfrageResponseDto>>>, AppError> {
    let (anfragen, total) = service.list(&pagination).await?;
    let dtos = anfragen.into_iter().map(AnfrageResponseDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}

/// Get a single intake request by id
#[utoipa::path(
    get,
    path = "/api/anfrage/{id}",
    tag = "anfragen",
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request found", body = ApiResponse<AnfrageResponseDto>),
        (status = 404, description = "Unknown request id"),
        (status = 401, description = "Missing or invalid credentials")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_anfrage(
    State(service): State<Arc<AnfrageService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnfrageResponseDto>>, AppError> {
    let anfrage = service.get_by_id(id).await?;

    Ok(Json(ApiResponse::success(
        Some(AnfrageResponseDto::from(anfrage)),
        None,
        None,
    )))
}

/// Update status or payload of an intake request
#[utoipa::path(
    put,
    path = "/api/anfrage/{id}",
    tag = "anfragen",
    params(("id" = Uuid, Path, description = "Request id")),
    request_body = UpdateAnfrageDto,
    responses(
        (status = 200, description = "Request updated", body = ApiResponse<AnfrageResponseDto>),
        (status = 400, description = "Payload variant does not match the stored request"),
        (status = 404, description = "Unknown request id"),
        (status = 401, description = "Missing or invalid credentials")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_anfrage(
    State(service): State<Arc<AnfrageService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateAnfrageDto>,
) -> Result<Json<ApiResponse<AnfrageResponseDto>>, AppError> {
    let anfrage = service.update(id, dto).await?;

    Ok(Json(ApiResponse::success(
        Some(AnfrageResponseDto::from(anfrage)),
        Some("Anfrage aktualisiert".to_string()),
        None,
    )))
}
