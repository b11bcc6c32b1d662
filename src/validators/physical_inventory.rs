use crate::dto::StockEventDto;
use crate::errors::{keys, ServiceError};
use crate::services::context::EventContext;
use crate::validators::StockEventValidator;

/// For physical inventory lines: the counted quantity must equal the current
/// stock on hand plus the sum of the signed adjustments. A discrepancy with
/// no adjustments supplied is its own rejection, and every adjustment must
/// carry a non-negative magnitude.
pub struct PhysicalInventoryReconciliationValidator;

impl StockEventValidator for PhysicalInventoryReconciliationValidator {
    fn name(&self) -> &'static str {
        "physical_inventory_reconciliation"
    }

    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError> {
        if !event.is_physical_inventory {
            return Ok(());
        }

        if event
            .stock_adjustments
            .iter()
            .any(|adjustment| adjustment.quantity < 0)
        {
            return Err(ServiceError::validation(
                keys::ERROR_ADJUSTMENT_QUANTITY_INVALID,
                "stock adjustments must carry non-negative quantities",
            ));
        }

        let current = ctx.current_stock_on_hand();
        let counted = i64::from(event.quantity);

        if event.stock_adjustments.is_empty() {
            if counted != current {
                return Err(ServiceError::validation(
                    keys::ERROR_PHYSICAL_INVENTORY_STOCK_ADJUSTMENTS_NOT_PROVIDED,
                    format!(
                        "counted quantity {} differs from stock on hand {} but no adjustments were provided",
                        counted, current
                    ),
                ));
            }
            return Ok(());
        }

        let mut signed_sum: i64 = 0;
        for adjustment in &event.stock_adjustments {
            let reason = ctx
                .adjustment_reasons
                .get(&adjustment.reason_id)
                .ok_or_else(|| {
                    ServiceError::validation(
                        keys::ERROR_REASON_NOT_FOUND,
                        format!("adjustment reason {} not found", adjustment.reason_id),
                    )
                })?;
            let magnitude = i64::from(adjustment.quantity);
            signed_sum += if reason.is_debit() { -magnitude } else { magnitude };
        }

        if current + signed_sum != counted {
            return Err(ServiceError::validation(
                keys::ERROR_PHYSICAL_INVENTORY_SOH_DIFFER,
                format!(
                    "stock on hand {} plus adjustments {} differs from counted quantity {}",
                    current, signed_sum, counted
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::StockAdjustmentDto;
    use crate::models::reason::{physical_credit, physical_debit};
    use crate::models::{CardLineItem, StockCard};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn ctx_with_balance(balance: i32) -> EventContext {
        let mut ctx = EventContext::default();
        let mut card = StockCard::empty(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), None);
        card.line_items.push(CardLineItem {
            id: Uuid::new_v4(),
            quantity: balance,
            reason: Some(physical_credit()),
            source_node_id: None,
            destination_node_id: None,
            occurred_date: Utc::now() - Duration::days(2),
            processed_date: Utc::now() - Duration::days(2),
            adjustments: Vec::new(),
            stock_on_hand: None,
        });
        ctx.card = Some(card);
        let credit = physical_credit();
        let debit = physical_debit();
        ctx.adjustment_reasons.insert(credit.id, credit);
        ctx.adjustment_reasons.insert(debit.id, debit);
        ctx
    }

    fn inventory_event(counted: i32, adjustments: Vec<StockAdjustmentDto>) -> StockEventDto {
        StockEventDto {
            quantity: counted,
            is_physical_inventory: true,
            stock_adjustments: adjustments,
            ..StockEventDto::default()
        }
    }

    #[test]
    fn matching_count_with_no_adjustments_passes() {
        let ctx = ctx_with_balance(10);
        let event = inventory_event(10, Vec::new());
        assert!(PhysicalInventoryReconciliationValidator
            .validate(&event, &ctx)
            .is_ok());
    }

    #[test]
    fn discrepancy_without_adjustments_is_rejected() {
        let ctx = ctx_with_balance(10);
        let event = inventory_event(15, Vec::new());

        let err = PhysicalInventoryReconciliationValidator
            .validate(&event, &ctx)
            .unwrap_err();
        assert_eq!(
            err.validation_key(),
            Some(keys::ERROR_PHYSICAL_INVENTORY_STOCK_ADJUSTMENTS_NOT_PROVIDED)
        );
    }

    #[test]
    fn reconciling_credit_adjustment_passes() {
        let ctx = ctx_with_balance(10);
        let event = inventory_event(
            15,
            vec![StockAdjustmentDto {
                reason_id: physical_credit().id,
                quantity: 5,
            }],
        );

        assert!(PhysicalInventoryReconciliationValidator
            .validate(&event, &ctx)
            .is_ok());
    }

    #[test]
    fn wrong_adjustment_sum_is_rejected() {
        let ctx = ctx_with_balance(10);
        let event = inventory_event(
            15,
            vec![StockAdjustmentDto {
                reason_id: physical_debit().id,
                quantity: 5,
            }],
        );

        let err = PhysicalInventoryReconciliationValidator
            .validate(&event, &ctx)
            .unwrap_err();
        assert_eq!(
            err.validation_key(),
            Some(keys::ERROR_PHYSICAL_INVENTORY_SOH_DIFFER)
        );
    }

    #[test]
    fn negative_adjustment_magnitude_is_rejected() {
        let ctx = ctx_with_balance(10);
        let event = inventory_event(
            5,
            vec![StockAdjustmentDto {
                reason_id: physical_debit().id,
                quantity: -5,
            }],
        );

        let err = PhysicalInventoryReconciliationValidator
            .validate(&event, &ctx)
            .unwrap_err();
        assert_eq!(
            err.validation_key(),
            Some(keys::ERROR_ADJUSTMENT_QUANTITY_INVALID)
        );
    }

    #[test]
    fn counting_an_empty_card_from_zero_passes() {
        let ctx = EventContext::default();
        let event = inventory_event(0, Vec::new());
        assert!(PhysicalInventoryReconciliationValidator
            .validate(&event, &ctx)
            .is_ok());
    }

    #[test]
    fn ordinary_events_are_not_judged_here() {
        let ctx = ctx_with_balance(10);
        let event = StockEventDto {
            quantity: 99,
            ..StockEventDto::default()
        };
        assert!(PhysicalInventoryReconciliationValidator
            .validate(&event, &ctx)
            .is_ok());
    }
}
