use utoipa::OpenApi;

use crate::dto;
use crate::errors;
use crate::handlers;
use crate::models;
use crate::services::reference_data;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MedStock API",
        description = "Stock management backend for a health supply chain platform"
    ),
    paths(
        handlers::stock_events::create_stock_event,
        handlers::stock_cards::get_stock_card,
        handlers::stock_cards::list_stock_card_summaries,
        handlers::physical_inventories::find_draft,
        handlers::physical_inventories::save_draft,
        handlers::physical_inventories::delete_draft,
        handlers::physical_inventories::submit_physical_inventory,
        handlers::reasons::get_all_reasons,
        handlers::reasons::create_reason,
        handlers::reasons::update_reason,
        handlers::source_destinations::get_valid_sources,
        handlers::source_destinations::get_valid_destinations,
    ),
    components(schemas(
        dto::StockEventDto,
        dto::StockAdjustmentDto,
        dto::PhysicalInventoryDto,
        dto::PhysicalInventoryLineItemDto,
        dto::StockCardDto,
        dto::StockCardLineItemDto,
        dto::StockCardSummaryDto,
        dto::NodeDisplayDto,
        dto::ReasonRequest,
        dto::ValidAssignmentDto,
        errors::ErrorResponse,
        models::Reason,
        models::ReasonType,
        models::ReasonCategory,
        reference_data::FacilityInfo,
        reference_data::ProgramInfo,
        reference_data::OrderableInfo,
    )),
    tags(
        (name = "stock-events", description = "Stock movement submission"),
        (name = "stock-cards", description = "Stock card views and balances"),
        (name = "physical-inventories", description = "Physical inventory drafts and submission"),
        (name = "reasons", description = "Reason catalog management"),
        (name = "source-destinations", description = "Valid movement endpoints")
    )
)]
pub struct ApiDoc;
