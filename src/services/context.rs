//! Pre-loaded context for one stock event. The processor builds this inside
//! the commit transaction; validators are then pure functions over it.

use crate::dto::StockEventDto;
use crate::entities::{node, stock_line_item_reason, valid_destination_assignment,
    valid_reason_assignment, valid_source_assignment};
use crate::errors::{keys, ServiceError};
use crate::models::{CardLineItem, Reason, SignedAdjustment, StockCard};
use crate::services::reference_data::{FacilityInfo, OrderableInfo, ProgramInfo,
    ReferenceDataService};
use crate::services::stock_card_service;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub struct EventContext {
    pub now: DateTime<Utc>,
    pub program: Option<ProgramInfo>,
    pub facility: Option<FacilityInfo>,
    pub orderable: Option<OrderableInfo>,
    pub approved_orderable_ids: HashSet<Uuid>,
    /// The event's reason, when the referenced id exists.
    pub reason: Option<Reason>,
    pub source_node: Option<node::Model>,
    pub destination_node: Option<node::Model>,
    pub valid_source_node_ids: HashSet<Uuid>,
    pub valid_destination_node_ids: HashSet<Uuid>,
    pub valid_reason_ids: HashSet<Uuid>,
    /// Reasons referenced by the event's stock adjustments.
    pub adjustment_reasons: HashMap<Uuid, Reason>,
    /// The card this event acts on, with full line item history; `None` for a
    /// first movement.
    pub card: Option<StockCard>,
}

impl Default for EventContext {
    fn default() -> Self {
        Self {
            now: Utc::now(),
            program: None,
            facility: None,
            orderable: None,
            approved_orderable_ids: HashSet::new(),
            reason: None,
            source_node: None,
            destination_node: None,
            valid_source_node_ids: HashSet::new(),
            valid_destination_node_ids: HashSet::new(),
            valid_reason_ids: HashSet::new(),
            adjustment_reasons: HashMap::new(),
            card: None,
        }
    }
}

impl EventContext {
    /// Eagerly load everything the validator chain reads. Reference data
    /// misses stay `None`/empty for the validators to judge.
    pub async fn load<C: ConnectionTrait>(
        db: &C,
        reference_data: &dyn ReferenceDataService,
        event: &StockEventDto,
    ) -> Result<Self, ServiceError> {
        let mut ctx = EventContext::default();

        if let Some(program_id) = event.program_id {
            ctx.program = reference_data.find_program(program_id).await?;
        }
        if let Some(facility_id) = event.facility_id {
            ctx.facility = reference_data.find_facility(facility_id).await?;
        }
        if let Some(orderable_id) = event.orderable_id {
            ctx.orderable = reference_data.find_orderable(orderable_id).await?;
        }

        if let (Some(program_id), Some(facility_id)) = (event.program_id, event.facility_id) {
            ctx.approved_orderable_ids = reference_data
                .approved_orderables(program_id, facility_id)
                .await?
                .into_iter()
                .map(|orderable| orderable.id)
                .collect();
        }

        if let Some(reason_id) = event.reason_id {
            ctx.reason = stock_line_item_reason::Entity::find_by_id(reason_id)
                .one(db)
                .await?
                .map(Reason::try_from)
                .transpose()?;
        }

        if let Some(source_id) = event.source_id {
            ctx.source_node = node::Entity::find_by_id(source_id).one(db).await?;
        }
        if let Some(destination_id) = event.destination_id {
            ctx.destination_node = node::Entity::find_by_id(destination_id).one(db).await?;
        }

        if let (Some(program), Some(facility)) = (&ctx.program, &ctx.facility) {
            ctx.valid_source_node_ids = valid_source_assignment::Entity::find()
                .filter(valid_source_assignment::Column::ProgramId.eq(program.id))
                .filter(
                    valid_source_assignment::Column::FacilityTypeId.eq(facility.facility_type_id),
                )
                .all(db)
                .await?
                .into_iter()
                .map(|assignment| assignment.node_id)
                .collect();

            ctx.valid_destination_node_ids = valid_destination_assignment::Entity::find()
                .filter(valid_destination_assignment::Column::ProgramId.eq(program.id))
                .filter(
                    valid_destination_assignment::Column::FacilityTypeId
                        .eq(facility.facility_type_id),
                )
                .all(db)
                .await?
                .into_iter()
                .map(|assignment| assignment.node_id)
                .collect();

            ctx.valid_reason_ids = valid_reason_assignment::Entity::find()
                .filter(valid_reason_assignment::Column::ProgramId.eq(program.id))
                .filter(
                    valid_reason_assignment::Column::FacilityTypeId.eq(facility.facility_type_id),
                )
                .all(db)
                .await?
                .into_iter()
                .map(|assignment| assignment.reason_id)
                .collect();
        }

        let adjustment_reason_ids: HashSet<Uuid> = event
            .stock_adjustments
            .iter()
            .map(|adjustment| adjustment.reason_id)
            .collect();
        if !adjustment_reason_ids.is_empty() {
            let reasons = stock_line_item_reason::Entity::find()
                .filter(
                    stock_line_item_reason::Column::Id
                        .is_in(adjustment_reason_ids.into_iter().collect::<Vec<_>>()),
                )
                .all(db)
                .await?;
            for model in reasons {
                let reason = Reason::try_from(model)?;
                ctx.adjustment_reasons.insert(reason.id, reason);
            }
        }

        if let (Some(facility_id), Some(program_id), Some(orderable_id)) =
            (event.facility_id, event.program_id, event.orderable_id)
        {
            if let Some(model) = stock_card_service::find_card_by_identity(
                db,
                facility_id,
                program_id,
                orderable_id,
                event.lot_id,
            )
            .await?
            {
                ctx.card = Some(stock_card_service::load_aggregate(db, model).await?);
            }
        }

        Ok(ctx)
    }

    /// Derive the not-yet-persisted line item this event would append. Used
    /// both for speculative recalculation and for the actual append, so the
    /// two can never diverge.
    pub fn candidate_line_item(&self, event: &StockEventDto) -> Result<CardLineItem, ServiceError> {
        let adjustments = event
            .stock_adjustments
            .iter()
            .map(|adjustment| {
                let reason = self
                    .adjustment_reasons
                    .get(&adjustment.reason_id)
                    .cloned()
                    .ok_or_else(|| {
                        ServiceError::validation(
                            keys::ERROR_REASON_NOT_FOUND,
                            format!("adjustment reason {} not found", adjustment.reason_id),
                        )
                    })?;
                Ok(SignedAdjustment {
                    reason,
                    quantity: adjustment.quantity,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(CardLineItem {
            id: Uuid::new_v4(),
            quantity: event.quantity,
            reason: self.reason.clone(),
            source_node_id: event.source_id,
            destination_node_id: event.destination_id,
            occurred_date: event.occurred_date.unwrap_or(self.now),
            processed_date: self.now,
            adjustments,
            stock_on_hand: None,
        })
    }

    /// The balance of the committed history for the event's card; zero when
    /// no card exists yet.
    pub fn current_stock_on_hand(&self) -> i64 {
        self.card
            .as_ref()
            .map(StockCard::computed_stock_on_hand)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::StockAdjustmentDto;
    use crate::models::reason::physical_credit;

    #[test]
    fn candidate_line_item_resolves_adjustment_reasons() {
        let reason = physical_credit();
        let mut ctx = EventContext::default();
        ctx.adjustment_reasons.insert(reason.id, reason.clone());

        let event = StockEventDto {
            quantity: 15,
            stock_adjustments: vec![StockAdjustmentDto {
                reason_id: reason.id,
                quantity: 5,
            }],
            ..StockEventDto::default()
        };

        let candidate = ctx.candidate_line_item(&event).unwrap();
        assert_eq!(candidate.adjustments.len(), 1);
        assert_eq!(candidate.adjustments[0].signed_quantity(), 5);
        assert_eq!(candidate.processed_date, ctx.now);
    }

    #[test]
    fn candidate_line_item_rejects_unknown_adjustment_reason() {
        let ctx = EventContext::default();
        let event = StockEventDto {
            quantity: 15,
            stock_adjustments: vec![StockAdjustmentDto {
                reason_id: Uuid::new_v4(),
                quantity: 5,
            }],
            ..StockEventDto::default()
        };

        let err = ctx.candidate_line_item(&event).unwrap_err();
        assert_eq!(err.validation_key(), Some(keys::ERROR_REASON_NOT_FOUND));
    }
}
