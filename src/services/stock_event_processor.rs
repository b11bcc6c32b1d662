//! Validates and persists stock events, appending the derived line item to
//! the owning stock card as one atomic unit.

use crate::db::DbPool;
use crate::dto::StockEventDto;
use crate::entities::{stock_adjustment, stock_card, stock_card_line_item, stock_event};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{CardLineItem, StockCard};
use crate::services::context::EventContext;
use crate::services::permission::PermissionService;
use crate::services::reference_data::ReferenceDataService;
use crate::validators::{default_validators, run_chain, StockEventValidator};
use metrics::counter;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, TransactionTrait};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct StockEventProcessor {
    db: Arc<DbPool>,
    reference_data: Arc<dyn ReferenceDataService>,
    permissions: Arc<dyn PermissionService>,
    event_sender: EventSender,
    validators: Vec<Box<dyn StockEventValidator>>,
}

impl StockEventProcessor {
    pub fn new(
        db: Arc<DbPool>,
        reference_data: Arc<dyn ReferenceDataService>,
        permissions: Arc<dyn PermissionService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            reference_data,
            permissions,
            event_sender,
            validators: default_validators(),
        }
    }

    /// Validate and persist one event. Either the event row, the (possibly
    /// new) card, and the derived line item all commit, or none do. Returns
    /// the persisted event's id.
    pub async fn process(
        &self,
        user_id: Uuid,
        mut event: StockEventDto,
    ) -> Result<Uuid, ServiceError> {
        self.resolve_alternative_identifier(&mut event).await?;

        if let (Some(program_id), Some(facility_id)) = (event.program_id, event.facility_id) {
            if event.is_physical_inventory {
                self.permissions
                    .can_edit_physical_inventory(user_id, program_id, facility_id)
                    .await?;
            } else {
                self.permissions
                    .can_adjust_stock(user_id, program_id, facility_id)
                    .await?;
            }
        }

        // Context load, validation, and the writes share one transaction so
        // the speculative recalculation judges exactly the state being
        // committed against.
        let txn = self.db.begin().await?;

        let ctx = EventContext::load(&txn, self.reference_data.as_ref(), &event).await?;
        run_chain(&self.validators, &event, &ctx)?;

        let event_id = Uuid::new_v4();
        let committed = persist_event(&txn, event_id, user_id, &event, &ctx).await?;

        txn.commit().await?;

        counter!("medstock_stock_events_processed_total", 1);
        info!(
            %event_id,
            stock_card_id = %committed.stock_card_id,
            stock_on_hand = committed.stock_on_hand,
            "stock event processed"
        );

        self.notify(event_id, &committed).await;

        Ok(event_id)
    }

    /// When the event references an existing card instead of naming its
    /// identity, backfill program/facility/orderable/lot so the validators
    /// see a complete tuple.
    async fn resolve_alternative_identifier(
        &self,
        event: &mut StockEventDto,
    ) -> Result<(), ServiceError> {
        let Some(stock_card_id) = event.stock_card_id else {
            return Ok(());
        };
        let card = stock_card::Entity::find_by_id(stock_card_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("stock card {} not found", stock_card_id))
            })?;

        debug!(%stock_card_id, "backfilling event identity from stock card");
        if event.program_id.is_none() {
            event.program_id = Some(card.program_id);
        }
        if event.facility_id.is_none() {
            event.facility_id = Some(card.facility_id);
        }
        if event.orderable_id.is_none() {
            event.orderable_id = Some(card.orderable_id);
        }
        if event.lot_id.is_none() {
            event.lot_id = card.lot_id;
        }
        Ok(())
    }

    async fn notify(&self, event_id: Uuid, committed: &CommittedEvent) {
        // Fire-and-forget: a full channel must never fail the committed write.
        let send_result = self
            .event_sender
            .send(Event::StockEventProcessed {
                event_id,
                program_id: committed.program_id,
                facility_id: committed.facility_id,
                orderable_id: committed.orderable_id,
                stock_on_hand: committed.stock_on_hand,
            })
            .await;
        if let Err(error) = send_result {
            warn!("failed to publish stock event notification: {}", error);
        }

        if committed.stock_on_hand == 0 {
            counter!("medstock_stockouts_total", 1);
            if let Err(error) = self
                .event_sender
                .send(Event::StockoutOccurred {
                    stock_card_id: committed.stock_card_id,
                    program_id: committed.program_id,
                    facility_id: committed.facility_id,
                    orderable_id: committed.orderable_id,
                })
                .await
            {
                warn!("failed to publish stockout notification: {}", error);
            }
        }
    }
}

struct CommittedEvent {
    stock_card_id: Uuid,
    program_id: Uuid,
    facility_id: Uuid,
    orderable_id: Uuid,
    stock_on_hand: i64,
}

/// Insert the event row, find or create the card, append the derived line
/// item, and store the recalculated balances. Runs inside the processor's
/// transaction.
async fn persist_event<C: ConnectionTrait>(
    txn: &C,
    event_id: Uuid,
    user_id: Uuid,
    event: &StockEventDto,
    ctx: &EventContext,
) -> Result<CommittedEvent, ServiceError> {
    // Identity completeness was enforced by the mandatory-fields validator.
    let (Some(program_id), Some(facility_id), Some(orderable_id)) =
        (event.program_id, event.facility_id, event.orderable_id)
    else {
        return Err(ServiceError::Internal(
            "persist_event called with incomplete identity".to_string(),
        ));
    };
    let occurred_date = event.occurred_date.unwrap_or(ctx.now);

    stock_event::ActiveModel {
        id: Set(event_id),
        quantity: Set(event.quantity),
        reason_id: Set(event.reason_id),
        facility_id: Set(facility_id),
        program_id: Set(program_id),
        orderable_id: Set(orderable_id),
        lot_id: Set(event.lot_id),
        user_id: Set(user_id),
        source_node_id: Set(event.source_id),
        destination_node_id: Set(event.destination_id),
        occurred_date: Set(occurred_date),
        noticed_date: Set(event.noticed_date.unwrap_or(ctx.now)),
        saved_date: Set(ctx.now),
        signature: Set(event.signature.clone()),
        reason_free_text: Set(event.reason_free_text.clone()),
        source_free_text: Set(event.source_free_text.clone()),
        destination_free_text: Set(event.destination_free_text.clone()),
        document_number: Set(event.document_number.clone()),
        is_physical_inventory: Set(event.is_physical_inventory),
    }
    .insert(txn)
    .await?;

    // Find-or-create the card. The context already loaded the aggregate when
    // a card exists.
    let mut aggregate = match &ctx.card {
        Some(card) => card.clone(),
        None => {
            debug!("creating new stock card for first movement");
            let card = StockCard::empty(facility_id, program_id, orderable_id, event.lot_id);
            stock_card::ActiveModel {
                id: Set(card.id),
                origin_event_id: Set(event_id),
                facility_id: Set(facility_id),
                program_id: Set(program_id),
                orderable_id: Set(orderable_id),
                lot_id: Set(event.lot_id),
                created_at: Set(ctx.now),
            }
            .insert(txn)
            .await?;
            card
        }
    };

    let candidate = ctx.candidate_line_item(event)?;
    let candidate_id = candidate.id;
    aggregate.line_items.push(candidate);
    aggregate.recalculate();

    // A backdated movement shifts the stored balance of everything after it,
    // so rewrite the prior rows; the stored column is a fast read, the
    // history stays the source of truth.
    let mut appended: Option<&CardLineItem> = None;
    for item in &aggregate.line_items {
        let balance = item.stock_on_hand.unwrap_or(0);
        if item.id == candidate_id {
            appended = Some(item);
        } else {
            stock_card_line_item::ActiveModel {
                id: Set(item.id),
                stock_on_hand: Set(balance as i32),
                ..Default::default()
            }
            .update(txn)
            .await?;
        }
    }
    let appended = appended.ok_or_else(|| {
        ServiceError::Internal("appended line item vanished during recalculation".to_string())
    })?;

    stock_card_line_item::ActiveModel {
        id: Set(candidate_id),
        stock_card_id: Set(aggregate.id),
        origin_event_id: Set(event_id),
        quantity: Set(event.quantity),
        reason_id: Set(event.reason_id),
        source_node_id: Set(event.source_id),
        destination_node_id: Set(event.destination_id),
        occurred_date: Set(appended.occurred_date),
        processed_date: Set(appended.processed_date),
        user_id: Set(user_id),
        stock_on_hand: Set(appended.stock_on_hand.unwrap_or(0) as i32),
        reason_free_text: Set(event.reason_free_text.clone()),
        source_free_text: Set(event.source_free_text.clone()),
        destination_free_text: Set(event.destination_free_text.clone()),
        document_number: Set(event.document_number.clone()),
        signature: Set(event.signature.clone()),
        vvm_status: Set(event.vvm_status.clone()),
    }
    .insert(txn)
    .await?;

    for adjustment in &appended.adjustments {
        stock_adjustment::ActiveModel {
            id: Set(Uuid::new_v4()),
            stock_card_line_item_id: Set(Some(candidate_id)),
            physical_inventory_line_item_id: Set(None),
            reason_id: Set(adjustment.reason.id),
            quantity: Set(adjustment.quantity),
        }
        .insert(txn)
        .await?;
    }

    Ok(CommittedEvent {
        stock_card_id: aggregate.id,
        program_id,
        facility_id,
        orderable_id,
        stock_on_hand: aggregate.stock_on_hand.unwrap_or(0),
    })
}
