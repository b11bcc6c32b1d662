use crate::dto::ReasonRequest;
use crate::errors::ServiceError;
use crate::handlers::user_id_from_headers;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all_reasons).post(create_reason))
        .route("/:id", put(update_reason))
}

#[utoipa::path(
    get,
    path = "/api/v1/stock-line-item-reasons",
    responses(
        (status = 200, description = "All reasons", body = [crate::models::Reason])
    ),
    tag = "reasons"
)]
pub async fn get_all_reasons(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let reasons = state.services.reasons.find_reasons().await?;
    Ok(Json(reasons))
}

/// Create a reason. Resubmitting an identical reason returns the existing one
/// with 200 instead of creating a duplicate.
#[utoipa::path(
    post,
    path = "/api/v1/stock-line-item-reasons",
    request_body = ReasonRequest,
    responses(
        (status = 201, description = "Reason created", body = crate::models::Reason),
        (status = 200, description = "Identical reason already exists", body = crate::models::Reason),
        (status = 403, description = "Missing permission", body = crate::errors::ErrorResponse)
    ),
    tag = "reasons"
)]
pub async fn create_reason(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ReasonRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_id_from_headers(&headers)?;
    let (reason, created) = state.services.reasons.create_reason(user_id, request).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(reason)))
}

/// Update a reason by id; unknown ids are a hard 404, unlike reads.
#[utoipa::path(
    put,
    path = "/api/v1/stock-line-item-reasons/{id}",
    params(("id" = Uuid, Path, description = "Reason id")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Reason updated", body = crate::models::Reason),
        (status = 403, description = "Missing permission", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such reason", body = crate::errors::ErrorResponse)
    ),
    tag = "reasons"
)]
pub async fn update_reason(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<ReasonRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_id_from_headers(&headers)?;
    let reason = state
        .services
        .reasons
        .update_reason(user_id, id, request)
        .await?;
    Ok(Json(reason))
}
