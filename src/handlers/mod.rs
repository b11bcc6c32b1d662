//! Thin HTTP layer: extract the principal, gate on permissions (inside the
//! services), call the service, shape the response.

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::permission::PermissionService;
use crate::services::physical_inventory_service::PhysicalInventoryService;
use crate::services::reason_service::ReasonService;
use crate::services::reference_data::ReferenceDataService;
use crate::services::source_destination_service::SourceDestinationService;
use crate::services::stock_card_service::StockCardService;
use crate::services::stock_event_processor::StockEventProcessor;
use crate::AppState;
use axum::http::HeaderMap;
use axum::Router;
use std::sync::Arc;
use uuid::Uuid;

pub mod physical_inventories;
pub mod reasons;
pub mod source_destinations;
pub mod stock_cards;
pub mod stock_events;

/// Aggregate of the services the HTTP handlers reach for.
#[derive(Clone)]
pub struct AppServices {
    pub processor: Arc<StockEventProcessor>,
    pub stock_cards: StockCardService,
    pub physical_inventories: Arc<PhysicalInventoryService>,
    pub reasons: Arc<ReasonService>,
    pub source_destinations: SourceDestinationService,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        reference_data: Arc<dyn ReferenceDataService>,
        permissions: Arc<dyn PermissionService>,
        event_sender: EventSender,
    ) -> Self {
        let processor = Arc::new(StockEventProcessor::new(
            db.clone(),
            reference_data.clone(),
            permissions.clone(),
            event_sender.clone(),
        ));
        Self {
            stock_cards: StockCardService::new(
                db.clone(),
                reference_data.clone(),
                permissions.clone(),
            ),
            physical_inventories: Arc::new(PhysicalInventoryService::new(
                db.clone(),
                processor.clone(),
                permissions.clone(),
                event_sender.clone(),
            )),
            reasons: Arc::new(ReasonService::new(db.clone(), permissions, event_sender)),
            source_destinations: SourceDestinationService::new(db, reference_data),
            processor,
        }
    }
}

/// The authenticated principal, injected by the gateway as `X-User-Id`.
/// Session handling itself is out of scope.
pub(crate) fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, ServiceError> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| {
            ServiceError::PermissionDenied("missing or invalid X-User-Id header".to_string())
        })
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/stock-events", stock_events::router())
        .nest("/stock-cards", stock_cards::router())
        .nest("/physical-inventories", physical_inventories::router())
        .nest("/stock-line-item-reasons", reasons::router())
        .merge(source_destinations::router())
}
