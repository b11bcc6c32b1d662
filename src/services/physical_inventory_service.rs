//! Physical inventory drafts and submission. Per (program, facility) the
//! lifecycle is NoDraft -> DraftExists -> (Submitted | Deleted); saving
//! replaces any prior draft outright, there is no merge.

use crate::db::DbPool;
use crate::dto::{PhysicalInventoryDto, PhysicalInventoryLineItemDto, StockAdjustmentDto};
use crate::entities::{physical_inventory, physical_inventory_line_item, stock_adjustment};
use crate::errors::{keys, ServiceError};
use crate::events::{Event, EventSender};
use crate::models::OrderableLotIdentity;
use crate::services::permission::PermissionService;
use crate::services::stock_card_service;
use crate::services::stock_event_processor::StockEventProcessor;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    QueryFilter, Set, TransactionTrait};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct PhysicalInventoryService {
    db: Arc<DbPool>,
    processor: Arc<StockEventProcessor>,
    permissions: Arc<dyn PermissionService>,
    event_sender: EventSender,
}

impl PhysicalInventoryService {
    pub fn new(
        db: Arc<DbPool>,
        processor: Arc<StockEventProcessor>,
        permissions: Arc<dyn PermissionService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            processor,
            permissions,
            event_sender,
        }
    }

    /// The saved draft merged with live balances, or a synthesized starter
    /// draft (one line per active card, nothing counted yet). The starter is
    /// a user-facing starting point and is never persisted.
    pub async fn find_draft(
        &self,
        user_id: Uuid,
        program_id: Uuid,
        facility_id: Uuid,
    ) -> Result<PhysicalInventoryDto, ServiceError> {
        self.permissions
            .can_edit_physical_inventory(user_id, program_id, facility_id)
            .await?;

        let db = self.db.as_ref();
        let summaries = stock_card_service::card_summaries(db, program_id, facility_id).await?;
        let balances: HashMap<OrderableLotIdentity, i64> = summaries
            .iter()
            .map(|summary| {
                (
                    OrderableLotIdentity::new(summary.orderable_id, summary.lot_id),
                    summary.stock_on_hand,
                )
            })
            .collect();

        let Some(draft) = find_draft_model(db, program_id, facility_id).await? else {
            return Ok(PhysicalInventoryDto {
                program_id,
                facility_id,
                occurred_date: None,
                document_number: None,
                signature: None,
                is_starter: true,
                line_items: summaries
                    .into_iter()
                    .map(|summary| PhysicalInventoryLineItemDto {
                        orderable_id: Some(summary.orderable_id),
                        lot_id: summary.lot_id,
                        quantity: None,
                        stock_on_hand: Some(summary.stock_on_hand),
                        stock_adjustments: Vec::new(),
                        vvm_status: None,
                    })
                    .collect(),
            });
        };

        let line_models = draft
            .find_related(physical_inventory_line_item::Entity)
            .all(db)
            .await?;
        let mut line_items = Vec::with_capacity(line_models.len());
        for line in line_models {
            let adjustments = stock_adjustment::Entity::find()
                .filter(stock_adjustment::Column::PhysicalInventoryLineItemId.eq(line.id))
                .all(db)
                .await?
                .into_iter()
                .map(|adjustment| StockAdjustmentDto {
                    reason_id: adjustment.reason_id,
                    quantity: adjustment.quantity,
                })
                .collect();
            let identity = OrderableLotIdentity::new(line.orderable_id, line.lot_id);
            line_items.push(PhysicalInventoryLineItemDto {
                orderable_id: Some(line.orderable_id),
                lot_id: line.lot_id,
                quantity: line.quantity,
                stock_on_hand: Some(balances.get(&identity).copied().unwrap_or(0)),
                stock_adjustments: adjustments,
                vvm_status: line.vvm_status,
            });
        }

        Ok(PhysicalInventoryDto {
            program_id,
            facility_id,
            occurred_date: Some(draft.occurred_date),
            document_number: draft.document_number,
            signature: draft.signature,
            is_starter: false,
            line_items,
        })
    }

    /// Replace (delete-then-insert) the draft for the dto's key.
    pub async fn save_draft(
        &self,
        user_id: Uuid,
        dto: PhysicalInventoryDto,
    ) -> Result<PhysicalInventoryDto, ServiceError> {
        self.permissions
            .can_edit_physical_inventory(user_id, dto.program_id, dto.facility_id)
            .await?;
        validate_line_items(&dto)?;

        let txn = self.db.begin().await?;
        delete_draft_rows(&txn, dto.program_id, dto.facility_id).await?;
        insert_inventory(&txn, &dto, true).await?;
        txn.commit().await?;

        info!(
            program_id = %dto.program_id,
            facility_id = %dto.facility_id,
            line_count = dto.line_items.len(),
            "physical inventory draft saved"
        );
        Ok(dto)
    }

    /// Deleting a missing draft is a no-op.
    pub async fn delete_draft(
        &self,
        user_id: Uuid,
        program_id: Uuid,
        facility_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.permissions
            .can_edit_physical_inventory(user_id, program_id, facility_id)
            .await?;

        let txn = self.db.begin().await?;
        delete_draft_rows(&txn, program_id, facility_id).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Validate the full submission, convert each counted line into a stock
    /// event handled by the processor, then persist the inventory as
    /// non-draft and drop any leftover draft.
    pub async fn submit(
        &self,
        user_id: Uuid,
        dto: PhysicalInventoryDto,
    ) -> Result<Uuid, ServiceError> {
        self.permissions
            .can_edit_physical_inventory(user_id, dto.program_id, dto.facility_id)
            .await?;
        validate_line_items(&dto)?;
        self.check_covers_active_cards(&dto).await?;

        let events = dto.to_event_dtos(Utc::now())?;
        info!(
            program_id = %dto.program_id,
            facility_id = %dto.facility_id,
            line_count = events.len(),
            "submitting physical inventory"
        );
        for event in events {
            self.processor.process(user_id, event).await?;
        }

        let txn = self.db.begin().await?;
        delete_draft_rows(&txn, dto.program_id, dto.facility_id).await?;
        let inventory_id = insert_inventory(&txn, &dto, false).await?;
        txn.commit().await?;

        if let Err(error) = self
            .event_sender
            .send(Event::PhysicalInventorySubmitted {
                inventory_id,
                program_id: dto.program_id,
                facility_id: dto.facility_id,
                line_count: dto.line_items.len(),
            })
            .await
        {
            warn!("failed to publish physical inventory notification: {}", error);
        }

        Ok(inventory_id)
    }

    /// Every card with history for the key must appear in the submission; an
    /// orderable with an existing card but no counted line is rejected.
    async fn check_covers_active_cards(
        &self,
        dto: &PhysicalInventoryDto,
    ) -> Result<(), ServiceError> {
        let covered: HashSet<OrderableLotIdentity> = dto
            .line_items
            .iter()
            .filter_map(|line| {
                line.orderable_id
                    .map(|orderable_id| OrderableLotIdentity::new(orderable_id, line.lot_id))
            })
            .collect();

        let active = stock_card_service::active_card_identities(
            self.db.as_ref(),
            dto.program_id,
            dto.facility_id,
        )
        .await?;

        if let Some(missing) = active.iter().find(|identity| !covered.contains(identity)) {
            return Err(ServiceError::validation(
                keys::ERROR_PHYSICAL_INVENTORY_ACTIVE_CARD_NOT_COVERED,
                format!(
                    "orderable {} has an active stock card but is not covered by this submission",
                    missing.orderable_id
                ),
            ));
        }
        Ok(())
    }
}

fn validate_line_items(dto: &PhysicalInventoryDto) -> Result<(), ServiceError> {
    if dto.line_items.is_empty() {
        return Err(ServiceError::validation(
            keys::ERROR_PHYSICAL_INVENTORY_LINE_ITEMS_MISSING,
            "physical inventory must have line items",
        ));
    }

    let mut seen = HashSet::new();
    for line in &dto.line_items {
        let orderable_id = line.orderable_id.ok_or_else(|| {
            ServiceError::validation(
                keys::ERROR_PHYSICAL_INVENTORY_ORDERABLE_MISSING,
                "physical inventory line item has no orderable",
            )
        })?;
        if !seen.insert(OrderableLotIdentity::new(orderable_id, line.lot_id)) {
            return Err(ServiceError::validation(
                keys::ERROR_PHYSICAL_INVENTORY_ORDERABLE_DUPLICATED,
                format!("orderable {} appears more than once", orderable_id),
            ));
        }
    }
    Ok(())
}

async fn find_draft_model<C: ConnectionTrait>(
    db: &C,
    program_id: Uuid,
    facility_id: Uuid,
) -> Result<Option<physical_inventory::Model>, ServiceError> {
    Ok(physical_inventory::Entity::find()
        .filter(physical_inventory::Column::ProgramId.eq(program_id))
        .filter(physical_inventory::Column::FacilityId.eq(facility_id))
        .filter(physical_inventory::Column::IsDraft.eq(true))
        .one(db)
        .await?)
}

/// Remove a draft and everything hanging off it. No-op when absent.
async fn delete_draft_rows<C: ConnectionTrait>(
    db: &C,
    program_id: Uuid,
    facility_id: Uuid,
) -> Result<(), ServiceError> {
    let Some(draft) = find_draft_model(db, program_id, facility_id).await? else {
        return Ok(());
    };

    let line_ids: Vec<Uuid> = draft
        .find_related(physical_inventory_line_item::Entity)
        .all(db)
        .await?
        .into_iter()
        .map(|line| line.id)
        .collect();

    if !line_ids.is_empty() {
        stock_adjustment::Entity::delete_many()
            .filter(stock_adjustment::Column::PhysicalInventoryLineItemId.is_in(line_ids.clone()))
            .exec(db)
            .await?;
        physical_inventory_line_item::Entity::delete_many()
            .filter(physical_inventory_line_item::Column::Id.is_in(line_ids))
            .exec(db)
            .await?;
    }

    physical_inventory::Entity::delete_by_id(draft.id)
        .exec(db)
        .await?;
    Ok(())
}

async fn insert_inventory<C: ConnectionTrait>(
    db: &C,
    dto: &PhysicalInventoryDto,
    is_draft: bool,
) -> Result<Uuid, ServiceError> {
    let now = Utc::now();
    let inventory_id = Uuid::new_v4();
    physical_inventory::ActiveModel {
        id: Set(inventory_id),
        program_id: Set(dto.program_id),
        facility_id: Set(dto.facility_id),
        occurred_date: Set(dto.occurred_date.unwrap_or(now)),
        document_number: Set(dto.document_number.clone()),
        signature: Set(dto.signature.clone()),
        is_draft: Set(is_draft),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    for line in &dto.line_items {
        let orderable_id = line.orderable_id.ok_or_else(|| {
            ServiceError::validation(
                keys::ERROR_PHYSICAL_INVENTORY_ORDERABLE_MISSING,
                "physical inventory line item has no orderable",
            )
        })?;
        let line_id = Uuid::new_v4();
        physical_inventory_line_item::ActiveModel {
            id: Set(line_id),
            physical_inventory_id: Set(inventory_id),
            orderable_id: Set(orderable_id),
            lot_id: Set(line.lot_id),
            quantity: Set(line.quantity),
            vvm_status: Set(line.vvm_status.clone()),
        }
        .insert(db)
        .await?;

        for adjustment in &line.stock_adjustments {
            stock_adjustment::ActiveModel {
                id: Set(Uuid::new_v4()),
                stock_card_line_item_id: Set(None),
                physical_inventory_line_item_id: Set(Some(line_id)),
                reason_id: Set(adjustment.reason_id),
                quantity: Set(adjustment.quantity),
            }
            .insert(db)
            .await?;
        }
    }

    Ok(inventory_id)
}
