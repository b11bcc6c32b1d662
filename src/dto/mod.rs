//! Request/response shapes for the HTTP surface, plus the conversions between
//! physical inventories and the stock events they reconcile into.

use crate::errors::{keys, ServiceError};
use crate::models::{OrderableLotIdentity, Reason};
use crate::services::reference_data::{FacilityInfo, OrderableInfo, ProgramInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One submitted movement: issue, receive, adjustment, or a single physical
/// inventory line. Immutable once accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StockEventDto {
    /// Non-negative magnitude as submitted; the reason/source/destination
    /// decide the sign.
    pub quantity: i32,
    pub reason_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub facility_id: Option<Uuid>,
    pub orderable_id: Option<Uuid>,
    pub lot_id: Option<Uuid>,
    /// Source node id; mutually exclusive with `destination_id`.
    pub source_id: Option<Uuid>,
    pub destination_id: Option<Uuid>,
    /// When the movement physically happened (business time).
    pub occurred_date: Option<DateTime<Utc>>,
    /// When the movement was noticed; defaults to submission time.
    pub noticed_date: Option<DateTime<Utc>>,
    pub source_free_text: Option<String>,
    pub destination_free_text: Option<String>,
    pub reason_free_text: Option<String>,
    pub document_number: Option<String>,
    pub signature: Option<String>,
    pub vvm_status: Option<String>,
    /// Alternative identifier: when set, program/facility/orderable/lot are
    /// backfilled from the referenced card before validation.
    pub stock_card_id: Option<Uuid>,
    /// Set only by the physical inventory reconciler, never by API clients.
    #[serde(skip)]
    pub is_physical_inventory: bool,
    /// Reconciling adjustments for a physical inventory line.
    #[serde(skip)]
    pub stock_adjustments: Vec<StockAdjustmentDto>,
}

impl StockEventDto {
    pub fn has_source(&self) -> bool {
        self.source_id.is_some()
    }

    pub fn has_destination(&self) -> bool {
        self.destination_id.is_some()
    }

    pub fn has_reason(&self) -> bool {
        self.reason_id.is_some()
    }

    pub fn identity(&self) -> Option<OrderableLotIdentity> {
        self.orderable_id
            .map(|orderable_id| OrderableLotIdentity::new(orderable_id, self.lot_id))
    }
}

/// A signed reconciliation entry on a physical inventory line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentDto {
    pub reason_id: Uuid,
    /// Non-negative magnitude; the reason type carries the sign.
    pub quantity: i32,
}

/// A draft or submitted full-facility counted snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalInventoryDto {
    pub program_id: Uuid,
    pub facility_id: Uuid,
    pub occurred_date: Option<DateTime<Utc>>,
    pub document_number: Option<String>,
    pub signature: Option<String>,
    /// True for a synthesized starting point that has never been saved.
    #[serde(default)]
    pub is_starter: bool,
    #[serde(default)]
    pub line_items: Vec<PhysicalInventoryLineItemDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalInventoryLineItemDto {
    /// Required on save and submit; optional in the wire shape so the
    /// reconciler can reject it with a stable key instead of a decode error.
    pub orderable_id: Option<Uuid>,
    pub lot_id: Option<Uuid>,
    /// Counted quantity; absent while the draft is still being filled in.
    pub quantity: Option<i32>,
    /// System stock on hand at read time; display data, never trusted on
    /// submit (the reconciliation validator recomputes it).
    pub stock_on_hand: Option<i64>,
    #[serde(default)]
    pub stock_adjustments: Vec<StockAdjustmentDto>,
    pub vvm_status: Option<String>,
}

impl PhysicalInventoryDto {
    /// Convert each counted line into an equivalent stock event for the
    /// processor. Lines must have been validated first; a missing counted
    /// quantity is rejected here as a safety net.
    pub fn to_event_dtos(&self, user_noticed: DateTime<Utc>) -> Result<Vec<StockEventDto>, ServiceError> {
        self.line_items
            .iter()
            .map(|line| {
                let orderable_id = line.orderable_id.ok_or_else(|| {
                    ServiceError::validation(
                        keys::ERROR_PHYSICAL_INVENTORY_ORDERABLE_MISSING,
                        "physical inventory line item has no orderable",
                    )
                })?;
                let quantity = line.quantity.ok_or_else(|| {
                    ServiceError::validation(
                        keys::ERROR_EVENT_QUANTITY_INVALID,
                        format!("orderable {} has no counted quantity", orderable_id),
                    )
                })?;
                Ok(StockEventDto {
                    quantity,
                    program_id: Some(self.program_id),
                    facility_id: Some(self.facility_id),
                    orderable_id: Some(orderable_id),
                    lot_id: line.lot_id,
                    occurred_date: self.occurred_date,
                    noticed_date: Some(user_noticed),
                    document_number: self.document_number.clone(),
                    signature: self.signature.clone(),
                    vvm_status: line.vvm_status.clone(),
                    is_physical_inventory: true,
                    stock_adjustments: line.stock_adjustments.clone(),
                    ..StockEventDto::default()
                })
            })
            .collect()
    }
}

/// Stock card view with resolved display data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockCardDto {
    pub id: Uuid,
    pub stock_on_hand: i64,
    pub facility: Option<FacilityInfo>,
    pub program: Option<ProgramInfo>,
    pub orderable: Option<OrderableInfo>,
    pub lot_id: Option<Uuid>,
    pub last_update: Option<DateTime<Utc>>,
    pub line_items: Vec<StockCardLineItemDto>,
}

/// A movement endpoint with its display name resolved: from reference data
/// for facilities, from the local organizations table otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeDisplayDto {
    pub node_id: Uuid,
    pub name: String,
    pub is_ref_data_facility: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockCardLineItemDto {
    pub id: Uuid,
    pub quantity: i32,
    pub reason: Option<Reason>,
    /// Resolved display data for the movement endpoints.
    pub source: Option<NodeDisplayDto>,
    pub destination: Option<NodeDisplayDto>,
    pub occurred_date: DateTime<Utc>,
    pub processed_date: DateTime<Utc>,
    pub stock_on_hand: i64,
    pub reason_free_text: Option<String>,
    pub source_free_text: Option<String>,
    pub destination_free_text: Option<String>,
    pub document_number: Option<String>,
    pub signature: Option<String>,
}

/// Compact per-card balance row, used by the physical inventory starter draft
/// and the card listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockCardSummaryDto {
    pub id: Uuid,
    pub orderable_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub stock_on_hand: i64,
    pub last_update: Option<DateTime<Utc>>,
}

/// Payload for creating or updating a reason catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReasonRequest {
    pub name: String,
    pub description: Option<String>,
    pub reason_type: crate::models::ReasonType,
    pub reason_category: crate::models::ReasonCategory,
    #[serde(default)]
    pub is_free_text_allowed: bool,
}

/// A configured source or destination with resolved display name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidAssignmentDto {
    pub id: Uuid,
    pub program_id: Uuid,
    pub facility_type_id: Uuid,
    pub node_id: Uuid,
    pub is_ref_data_facility: bool,
    pub name: Option<String>,
}
