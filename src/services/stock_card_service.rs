//! Stock card reads: aggregate assembly from entity rows, card views with
//! resolved display data, and per-card balance summaries.

use crate::db::DbPool;
use crate::dto::{StockCardDto, StockCardLineItemDto, StockCardSummaryDto};
use crate::entities::{stock_adjustment, stock_card, stock_card_line_item, stock_line_item_reason};
use crate::errors::ServiceError;
use crate::models::{CardLineItem, OrderableLotIdentity, Reason, SignedAdjustment, StockCard};
use crate::services::permission::PermissionService;
use crate::services::reference_data::ReferenceDataService;
use crate::services::source_destination_service::resolve_node_display;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Look a card up by its full identity tuple.
pub(crate) async fn find_card_by_identity<C: ConnectionTrait>(
    db: &C,
    facility_id: Uuid,
    program_id: Uuid,
    orderable_id: Uuid,
    lot_id: Option<Uuid>,
) -> Result<Option<stock_card::Model>, ServiceError> {
    let mut query = stock_card::Entity::find()
        .filter(stock_card::Column::FacilityId.eq(facility_id))
        .filter(stock_card::Column::ProgramId.eq(program_id))
        .filter(stock_card::Column::OrderableId.eq(orderable_id));
    query = match lot_id {
        Some(lot_id) => query.filter(stock_card::Column::LotId.eq(lot_id)),
        None => query.filter(stock_card::Column::LotId.is_null()),
    };
    Ok(query.one(db).await?)
}

/// Assemble the domain aggregate for a card row: line items with their
/// reasons and adjustments resolved. Balances are not computed here; callers
/// decide when to recalculate.
pub(crate) async fn load_aggregate<C: ConnectionTrait>(
    db: &C,
    model: stock_card::Model,
) -> Result<StockCard, ServiceError> {
    let (aggregate, _rows) = load_aggregate_with_rows(db, model).await?;
    Ok(aggregate)
}

/// As `load_aggregate`, but also hands back the raw rows for view fields the
/// domain aggregate does not carry (free text, document number, signature).
pub(crate) async fn load_aggregate_with_rows<C: ConnectionTrait>(
    db: &C,
    model: stock_card::Model,
) -> Result<(StockCard, HashMap<Uuid, stock_card_line_item::Model>), ServiceError> {
    let item_models = stock_card_line_item::Entity::find()
        .filter(stock_card_line_item::Column::StockCardId.eq(model.id))
        .all(db)
        .await?;

    let item_ids: Vec<Uuid> = item_models.iter().map(|item| item.id).collect();
    let adjustment_models = if item_ids.is_empty() {
        Vec::new()
    } else {
        stock_adjustment::Entity::find()
            .filter(stock_adjustment::Column::StockCardLineItemId.is_in(item_ids))
            .all(db)
            .await?
    };

    let mut reason_ids: HashSet<Uuid> =
        item_models.iter().filter_map(|item| item.reason_id).collect();
    reason_ids.extend(adjustment_models.iter().map(|adjustment| adjustment.reason_id));
    let reasons = load_reasons(db, reason_ids).await?;

    let mut adjustments_by_item: HashMap<Uuid, Vec<SignedAdjustment>> = HashMap::new();
    for adjustment in adjustment_models {
        let Some(item_id) = adjustment.stock_card_line_item_id else {
            continue;
        };
        let reason = reasons.get(&adjustment.reason_id).cloned().ok_or_else(|| {
            ServiceError::Internal(format!(
                "stock adjustment {} references missing reason {}",
                adjustment.id, adjustment.reason_id
            ))
        })?;
        adjustments_by_item
            .entry(item_id)
            .or_default()
            .push(SignedAdjustment {
                reason,
                quantity: adjustment.quantity,
            });
    }

    let mut line_items = Vec::with_capacity(item_models.len());
    let mut rows = HashMap::with_capacity(item_models.len());
    for item in item_models {
        let reason = match item.reason_id {
            Some(reason_id) => Some(reasons.get(&reason_id).cloned().ok_or_else(|| {
                ServiceError::Internal(format!(
                    "line item {} references missing reason {}",
                    item.id, reason_id
                ))
            })?),
            None => None,
        };
        line_items.push(CardLineItem {
            id: item.id,
            quantity: item.quantity,
            reason,
            source_node_id: item.source_node_id,
            destination_node_id: item.destination_node_id,
            occurred_date: item.occurred_date,
            processed_date: item.processed_date,
            adjustments: adjustments_by_item.remove(&item.id).unwrap_or_default(),
            stock_on_hand: None,
        });
        rows.insert(item.id, item);
    }

    let aggregate = StockCard {
        id: model.id,
        facility_id: model.facility_id,
        program_id: model.program_id,
        orderable_id: model.orderable_id,
        lot_id: model.lot_id,
        line_items,
        stock_on_hand: None,
    };
    Ok((aggregate, rows))
}

async fn load_reasons<C: ConnectionTrait>(
    db: &C,
    reason_ids: HashSet<Uuid>,
) -> Result<HashMap<Uuid, Reason>, ServiceError> {
    if reason_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let models = stock_line_item_reason::Entity::find()
        .filter(stock_line_item_reason::Column::Id.is_in(reason_ids.into_iter().collect::<Vec<_>>()))
        .all(db)
        .await?;
    let mut reasons = HashMap::with_capacity(models.len());
    for model in models {
        let reason = Reason::try_from(model)?;
        reasons.insert(reason.id, reason);
    }
    Ok(reasons)
}

/// Recalculated balance rows for every card of a program/facility pair.
pub(crate) async fn card_summaries<C: ConnectionTrait>(
    db: &C,
    program_id: Uuid,
    facility_id: Uuid,
) -> Result<Vec<StockCardSummaryDto>, ServiceError> {
    let card_models = stock_card::Entity::find()
        .filter(stock_card::Column::ProgramId.eq(program_id))
        .filter(stock_card::Column::FacilityId.eq(facility_id))
        .all(db)
        .await?;

    let mut summaries = Vec::with_capacity(card_models.len());
    for model in card_models {
        let mut aggregate = load_aggregate(db, model).await?;
        aggregate.recalculate();
        summaries.push(StockCardSummaryDto {
            id: aggregate.id,
            orderable_id: aggregate.orderable_id,
            lot_id: aggregate.lot_id,
            stock_on_hand: aggregate.stock_on_hand.unwrap_or(0),
            last_update: aggregate
                .line_items
                .iter()
                .map(|item| item.processed_date)
                .max(),
        });
    }
    Ok(summaries)
}

/// Identities of every card with history for a program/facility pair; the
/// physical inventory coverage rule is checked against this set.
pub(crate) async fn active_card_identities<C: ConnectionTrait>(
    db: &C,
    program_id: Uuid,
    facility_id: Uuid,
) -> Result<Vec<OrderableLotIdentity>, ServiceError> {
    let cards = stock_card::Entity::find()
        .filter(stock_card::Column::ProgramId.eq(program_id))
        .filter(stock_card::Column::FacilityId.eq(facility_id))
        .all(db)
        .await?;
    Ok(cards
        .into_iter()
        .map(|card| OrderableLotIdentity::new(card.orderable_id, card.lot_id))
        .collect())
}

#[derive(Clone)]
pub struct StockCardService {
    db: Arc<DbPool>,
    reference_data: Arc<dyn ReferenceDataService>,
    permissions: Arc<dyn PermissionService>,
}

impl StockCardService {
    pub fn new(
        db: Arc<DbPool>,
        reference_data: Arc<dyn ReferenceDataService>,
        permissions: Arc<dyn PermissionService>,
    ) -> Self {
        Self {
            db,
            reference_data,
            permissions,
        }
    }

    /// Card view with recalculated balance and resolved display data.
    /// Returns `None` for an unknown id (reads treat not-found as absence).
    pub async fn find_card(
        &self,
        user_id: Uuid,
        card_id: Uuid,
    ) -> Result<Option<StockCardDto>, ServiceError> {
        let Some(model) = stock_card::Entity::find_by_id(card_id)
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };
        debug!(%card_id, "stock card found");

        self.permissions
            .can_view_stock_card(user_id, model.program_id, model.facility_id)
            .await?;

        let db = self.db.as_ref();
        let (mut aggregate, rows) = load_aggregate_with_rows(db, model).await?;
        aggregate.recalculate();

        let facility = self
            .reference_data
            .find_facility(aggregate.facility_id)
            .await?;
        let program = self.reference_data.find_program(aggregate.program_id).await?;
        let orderable = self
            .reference_data
            .find_orderable(aggregate.orderable_id)
            .await?;

        let mut line_items = Vec::with_capacity(aggregate.line_items.len());
        for item in &aggregate.line_items {
            let source = match item.source_node_id {
                Some(node_id) => {
                    resolve_node_display(db, self.reference_data.as_ref(), node_id).await?
                }
                None => None,
            };
            let destination = match item.destination_node_id {
                Some(node_id) => {
                    resolve_node_display(db, self.reference_data.as_ref(), node_id).await?
                }
                None => None,
            };
            // Free text and document fields live on the entity row, not the
            // domain aggregate.
            let row = rows.get(&item.id);
            line_items.push(StockCardLineItemDto {
                id: item.id,
                quantity: item.quantity,
                reason: item.reason.clone(),
                source,
                destination,
                occurred_date: item.occurred_date,
                processed_date: item.processed_date,
                stock_on_hand: item.stock_on_hand.unwrap_or(0),
                reason_free_text: row.and_then(|row| row.reason_free_text.clone()),
                source_free_text: row.and_then(|row| row.source_free_text.clone()),
                destination_free_text: row.and_then(|row| row.destination_free_text.clone()),
                document_number: row.and_then(|row| row.document_number.clone()),
                signature: row.and_then(|row| row.signature.clone()),
            });
        }

        Ok(Some(StockCardDto {
            id: aggregate.id,
            stock_on_hand: aggregate.stock_on_hand.unwrap_or(0),
            facility,
            program,
            orderable,
            lot_id: aggregate.lot_id,
            last_update: aggregate
                .line_items
                .iter()
                .map(|item| item.processed_date)
                .max(),
            line_items,
        }))
    }

    /// Per-card balances for a program/facility pair.
    pub async fn find_card_summaries(
        &self,
        user_id: Uuid,
        program_id: Uuid,
        facility_id: Uuid,
    ) -> Result<Vec<StockCardSummaryDto>, ServiceError> {
        self.permissions
            .can_view_stock_card(user_id, program_id, facility_id)
            .await?;
        card_summaries(self.db.as_ref(), program_id, facility_id).await
    }
}
