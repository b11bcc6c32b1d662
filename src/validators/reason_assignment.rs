use crate::dto::StockEventDto;
use crate::errors::{keys, ServiceError};
use crate::services::context::EventContext;
use crate::validators::StockEventValidator;

/// A present reason must come from the valid reason list configured for the
/// program and facility type. An unknown reason id is by definition not in
/// the list, so not-found surfaces as this validation failure.
pub struct ReasonAssignmentValidator;

impl StockEventValidator for ReasonAssignmentValidator {
    fn name(&self) -> &'static str {
        "reason_assignment"
    }

    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError> {
        let Some(reason_id) = event.reason_id else {
            return Ok(());
        };
        if ctx.program.is_none() || ctx.facility.is_none() {
            return Ok(());
        }

        if !ctx.valid_reason_ids.contains(&reason_id) {
            return Err(ServiceError::validation(
                keys::ERROR_REASON_NOT_IN_VALID_LIST,
                format!("reason {} is not in the configured valid list", reason_id),
            ));
        }

        Ok(())
    }
}
