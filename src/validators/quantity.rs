use crate::dto::StockEventDto;
use crate::errors::{keys, ServiceError};
use crate::models::{StockCard, STOCK_ON_HAND_CEILING};
use crate::services::context::EventContext;
use crate::validators::StockEventValidator;

/// Makes sure no running balance goes below zero or above the integer
/// ceiling. Re-derives the card's full history plus the candidate item and
/// recalculates on a clone, so speculative mutation never reaches persisted
/// state. Recalculating grows with line item count; it is the most expensive
/// link in the chain, which is why it runs last among the movement checks.
pub struct QuantityValidator;

impl StockEventValidator for QuantityValidator {
    fn name(&self) -> &'static str {
        "quantity"
    }

    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError> {
        let (Some(facility_id), Some(program_id), Some(orderable_id)) =
            (event.facility_id, event.program_id, event.orderable_id)
        else {
            return Ok(());
        };

        let candidate = ctx.candidate_line_item(event)?;

        let mut speculative = ctx
            .card
            .clone()
            .unwrap_or_else(|| StockCard::empty(facility_id, program_id, orderable_id, event.lot_id));
        speculative.line_items.push(candidate);
        speculative.recalculate();

        for item in &speculative.line_items {
            let Some(stock_on_hand) = item.stock_on_hand else {
                continue;
            };
            if stock_on_hand < 0 {
                return Err(ServiceError::validation(
                    keys::ERROR_EVENT_DEBIT_QUANTITY_EXCEEDS_SOH,
                    "debit quantity exceeds stock on hand",
                ));
            }
            if stock_on_hand > STOCK_ON_HAND_CEILING {
                return Err(ServiceError::validation(
                    keys::ERROR_EVENT_SOH_EXCEEDS_UPPER_LIMIT,
                    format!(
                        "stock on hand would exceed the upper limit of {}",
                        STOCK_ON_HAND_CEILING
                    ),
                ));
            }
        }

        Ok(())
    }
}
