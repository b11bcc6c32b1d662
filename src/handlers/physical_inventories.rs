use crate::dto::PhysicalInventoryDto;
use crate::errors::ServiceError;
use crate::handlers::user_id_from_headers;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/draft",
            get(find_draft).post(save_draft).delete(delete_draft),
        )
        .route("/", post(submit_physical_inventory))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DraftKey {
    pub program_id: Uuid,
    pub facility_id: Uuid,
}

/// The saved draft, or a synthesized starter draft with one line per active
/// card.
#[utoipa::path(
    get,
    path = "/api/v1/physical-inventories/draft",
    params(DraftKey),
    responses(
        (status = 200, description = "Draft (saved or starter)", body = PhysicalInventoryDto),
        (status = 403, description = "Missing permission", body = crate::errors::ErrorResponse)
    ),
    tag = "physical-inventories"
)]
pub async fn find_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(key): Query<DraftKey>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_id_from_headers(&headers)?;
    let draft = state
        .services
        .physical_inventories
        .find_draft(user_id, key.program_id, key.facility_id)
        .await?;
    Ok(Json(draft))
}

/// Save a draft, replacing any prior draft for the same program/facility.
#[utoipa::path(
    post,
    path = "/api/v1/physical-inventories/draft",
    request_body = PhysicalInventoryDto,
    responses(
        (status = 201, description = "Draft saved", body = PhysicalInventoryDto),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Missing permission", body = crate::errors::ErrorResponse)
    ),
    tag = "physical-inventories"
)]
pub async fn save_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(dto): Json<PhysicalInventoryDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_id_from_headers(&headers)?;
    let saved = state
        .services
        .physical_inventories
        .save_draft(user_id, dto)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Delete the draft for a program/facility; deleting a missing draft is a
/// no-op.
#[utoipa::path(
    delete,
    path = "/api/v1/physical-inventories/draft",
    params(DraftKey),
    responses(
        (status = 204, description = "Draft deleted (or was absent)"),
        (status = 403, description = "Missing permission", body = crate::errors::ErrorResponse)
    ),
    tag = "physical-inventories"
)]
pub async fn delete_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(key): Query<DraftKey>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_id_from_headers(&headers)?;
    state
        .services
        .physical_inventories
        .delete_draft(user_id, key.program_id, key.facility_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit a physical inventory: every line becomes a reconciling stock event.
#[utoipa::path(
    post,
    path = "/api/v1/physical-inventories",
    request_body = PhysicalInventoryDto,
    responses(
        (status = 201, description = "Inventory submitted, returns the inventory id", body = uuid::Uuid),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Missing permission", body = crate::errors::ErrorResponse)
    ),
    tag = "physical-inventories"
)]
pub async fn submit_physical_inventory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(dto): Json<PhysicalInventoryDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_id_from_headers(&headers)?;
    let inventory_id = state
        .services
        .physical_inventories
        .submit(user_id, dto)
        .await?;
    Ok((StatusCode::CREATED, Json(inventory_id)))
}
