use crate::errors::ServiceError;
use crate::handlers::user_id_from_headers;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock_card_summaries))
        .route("/:id", get(get_stock_card))
}

/// Stock card view with line items and resolved source/destination data.
#[utoipa::path(
    get,
    path = "/api/v1/stock-cards/{id}",
    params(("id" = Uuid, Path, description = "Stock card id")),
    responses(
        (status = 200, description = "Stock card found", body = crate::dto::StockCardDto),
        (status = 403, description = "Missing permission", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such stock card", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-cards"
)]
pub async fn get_stock_card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_id_from_headers(&headers)?;
    let card = state
        .services
        .stock_cards
        .find_card(user_id, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("stock card {} not found", id)))?;
    Ok(Json(card))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SummaryFilters {
    pub program_id: Uuid,
    pub facility_id: Uuid,
}

/// Per-card balances for one program at one facility.
#[utoipa::path(
    get,
    path = "/api/v1/stock-cards",
    params(SummaryFilters),
    responses(
        (status = 200, description = "Card summaries", body = [crate::dto::StockCardSummaryDto]),
        (status = 403, description = "Missing permission", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-cards"
)]
pub async fn list_stock_card_summaries(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filters): Query<SummaryFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_id_from_headers(&headers)?;
    let summaries = state
        .services
        .stock_cards
        .find_card_summaries(user_id, filters.program_id, filters.facility_id)
        .await?;
    Ok(Json(summaries))
}
