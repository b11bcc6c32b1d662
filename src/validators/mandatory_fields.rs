use crate::dto::StockEventDto;
use crate::errors::{keys, ServiceError};
use crate::services::context::EventContext;
use crate::validators::StockEventValidator;

/// Rejects events missing their identity fields or occurred date, carrying a
/// negative quantity, or naming no movement kind at all. Runs after the
/// processor has backfilled identity from an alternative card id, so a bare
/// `stockCardId` submission still passes.
pub struct MandatoryFieldsValidator;

impl StockEventValidator for MandatoryFieldsValidator {
    fn name(&self) -> &'static str {
        "mandatory_fields"
    }

    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError> {
        if event.program_id.is_none() {
            return Err(ServiceError::validation(
                keys::ERROR_EVENT_PROGRAM_INVALID,
                "program id is missing",
            ));
        }
        if event.facility_id.is_none() {
            return Err(ServiceError::validation(
                keys::ERROR_EVENT_FACILITY_INVALID,
                "facility id is missing",
            ));
        }
        if event.orderable_id.is_none() {
            return Err(ServiceError::validation(
                keys::ERROR_EVENT_ORDERABLE_INVALID,
                "orderable id is missing",
            ));
        }

        match event.occurred_date {
            None => {
                return Err(ServiceError::validation(
                    keys::ERROR_EVENT_OCCURRED_DATE_INVALID,
                    "occurred date is missing",
                ));
            }
            Some(occurred) if occurred > ctx.now => {
                return Err(ServiceError::validation(
                    keys::ERROR_EVENT_OCCURRED_DATE_INVALID,
                    "occurred date is in the future",
                ));
            }
            Some(_) => {}
        }

        if event.quantity < 0 {
            return Err(ServiceError::validation(
                keys::ERROR_EVENT_QUANTITY_INVALID,
                format!("quantity must be a non-negative magnitude, got {}", event.quantity),
            ));
        }

        let names_movement_kind = event.has_reason()
            || event.has_source()
            || event.has_destination()
            || event.is_physical_inventory;
        if !names_movement_kind {
            return Err(ServiceError::validation(
                keys::ERROR_EVENT_MOVEMENT_KIND_MISSING,
                "event must carry a reason, a source, or a destination",
            ));
        }

        Ok(())
    }
}
