use crate::dto::StockEventDto;
use crate::errors::{keys, ServiceError};
use crate::services::context::EventContext;
use crate::validators::StockEventValidator;

/// A plain adjustment (no source, no destination) needs a reason that is
/// CREDIT or DEBIT typed and carries the ADJUSTMENT category. Whether the
/// reason id resolves at all is the reason-assignment validator's problem.
pub struct AdjustmentReasonValidator;

impl StockEventValidator for AdjustmentReasonValidator {
    fn name(&self) -> &'static str {
        "adjustment_reason"
    }

    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError> {
        if event.has_source() || event.has_destination() || event.is_physical_inventory {
            return Ok(());
        }
        let Some(reason) = &ctx.reason else {
            return Ok(());
        };

        if !reason.is_credit() && !reason.is_debit() {
            return Err(ServiceError::validation(
                keys::ERROR_EVENT_ADJUSTMENT_REASON_TYPE_INVALID,
                format!(
                    "adjustment reason type {} is not CREDIT or DEBIT",
                    reason.reason_type
                ),
            ));
        }

        if !reason.is_adjustment_category() {
            return Err(ServiceError::validation(
                keys::ERROR_EVENT_ADJUSTMENT_REASON_CATEGORY_INVALID,
                format!(
                    "adjustment reason category {} is not ADJUSTMENT",
                    reason.reason_category
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Reason, ReasonCategory, ReasonType};
    use uuid::Uuid;

    fn reason(reason_type: ReasonType, reason_category: ReasonCategory) -> Reason {
        Reason {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            description: None,
            reason_type,
            reason_category,
            is_free_text_allowed: false,
        }
    }

    #[test]
    fn balance_adjustment_type_cannot_drive_a_plain_adjustment() {
        let mut ctx = EventContext::default();
        ctx.reason = Some(reason(
            ReasonType::BalanceAdjustment,
            ReasonCategory::Adjustment,
        ));
        let event = StockEventDto {
            reason_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        let err = AdjustmentReasonValidator.validate(&event, &ctx).unwrap_err();
        assert_eq!(
            err.validation_key(),
            Some(keys::ERROR_EVENT_ADJUSTMENT_REASON_TYPE_INVALID)
        );
    }

    #[test]
    fn non_adjustment_category_is_rejected() {
        let mut ctx = EventContext::default();
        ctx.reason = Some(reason(ReasonType::Credit, ReasonCategory::Transfer));
        let event = StockEventDto {
            reason_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        let err = AdjustmentReasonValidator.validate(&event, &ctx).unwrap_err();
        assert_eq!(
            err.validation_key(),
            Some(keys::ERROR_EVENT_ADJUSTMENT_REASON_CATEGORY_INVALID)
        );
    }

    #[test]
    fn credit_adjustment_reason_passes() {
        let mut ctx = EventContext::default();
        ctx.reason = Some(reason(ReasonType::Credit, ReasonCategory::Adjustment));
        let event = StockEventDto {
            reason_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        assert!(AdjustmentReasonValidator.validate(&event, &ctx).is_ok());
    }

    #[test]
    fn issues_and_receives_are_not_judged_here() {
        let mut ctx = EventContext::default();
        ctx.reason = Some(reason(ReasonType::BalanceAdjustment, ReasonCategory::AdHoc));
        let event = StockEventDto {
            reason_id: Some(Uuid::new_v4()),
            destination_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        assert!(AdjustmentReasonValidator.validate(&event, &ctx).is_ok());
    }

    #[test]
    fn unresolved_reason_is_left_to_the_assignment_validator() {
        let ctx = EventContext::default();
        let event = StockEventDto {
            reason_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        assert!(AdjustmentReasonValidator.validate(&event, &ctx).is_ok());
    }
}
