use crate::errors::ServiceError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/valid-sources", get(get_valid_sources))
        .route("/valid-destinations", get(get_valid_destinations))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentFilters {
    pub program_id: Uuid,
    pub facility_type_id: Uuid,
}

/// Configured sources a facility of this type may receive from.
#[utoipa::path(
    get,
    path = "/api/v1/valid-sources",
    params(AssignmentFilters),
    responses(
        (status = 200, description = "Valid sources", body = [crate::dto::ValidAssignmentDto])
    ),
    tag = "source-destinations"
)]
pub async fn get_valid_sources(
    State(state): State<AppState>,
    Query(filters): Query<AssignmentFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let assignments = state
        .services
        .source_destinations
        .valid_sources(filters.program_id, filters.facility_type_id)
        .await?;
    Ok(Json(assignments))
}

/// Configured destinations a facility of this type may issue to.
#[utoipa::path(
    get,
    path = "/api/v1/valid-destinations",
    params(AssignmentFilters),
    responses(
        (status = 200, description = "Valid destinations", body = [crate::dto::ValidAssignmentDto])
    ),
    tag = "source-destinations"
)]
pub async fn get_valid_destinations(
    State(state): State<AppState>,
    Query(filters): Query<AssignmentFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let assignments = state
        .services
        .source_destinations
        .valid_destinations(filters.program_id, filters.facility_type_id)
        .await?;
    Ok(Json(assignments))
}
