use crate::dto::StockEventDto;
use crate::errors::ServiceError;
use crate::handlers::user_id_from_headers;
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use tracing::debug;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_stock_event))
}

/// Submit a stock event (receipt, issue, or adjustment).
#[utoipa::path(
    post,
    path = "/api/v1/stock-events",
    request_body = StockEventDto,
    responses(
        (status = 201, description = "Stock event accepted, returns the event id", body = uuid::Uuid),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 403, description = "Missing permission", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-events"
)]
pub async fn create_stock_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(dto): Json<StockEventDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_id_from_headers(&headers)?;
    debug!("try to create a stock event");
    let event_id = state.services.processor.process(user_id, dto).await?;
    Ok((StatusCode::CREATED, Json(event_id)))
}
