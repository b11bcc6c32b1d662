use crate::dto::StockEventDto;
use crate::errors::{keys, ServiceError};
use crate::services::context::EventContext;
use crate::validators::StockEventValidator;

/// Rejects orderables outside the approved-product list for the event's
/// program and facility. A missing program or facility is not judged here.
pub struct ApprovedOrderableValidator;

impl StockEventValidator for ApprovedOrderableValidator {
    fn name(&self) -> &'static str {
        "approved_orderable"
    }

    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError> {
        let (Some(_), Some(_), Some(orderable_id)) =
            (event.program_id, event.facility_id, event.orderable_id)
        else {
            return Ok(());
        };

        if !ctx.approved_orderable_ids.contains(&orderable_id) {
            return Err(ServiceError::validation(
                keys::ERROR_EVENT_ORDERABLE_NOT_APPROVED,
                format!(
                    "orderable {} is not approved for this program and facility",
                    orderable_id
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn orderable_outside_approved_list_is_rejected() {
        let mut ctx = EventContext::default();
        ctx.approved_orderable_ids.insert(Uuid::new_v4());
        let event = StockEventDto {
            program_id: Some(Uuid::new_v4()),
            facility_id: Some(Uuid::new_v4()),
            orderable_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        let err = ApprovedOrderableValidator.validate(&event, &ctx).unwrap_err();
        assert_eq!(
            err.validation_key(),
            Some(keys::ERROR_EVENT_ORDERABLE_NOT_APPROVED)
        );
    }

    #[test]
    fn approved_orderable_passes() {
        let orderable_id = Uuid::new_v4();
        let mut ctx = EventContext::default();
        ctx.approved_orderable_ids.insert(orderable_id);
        let event = StockEventDto {
            program_id: Some(Uuid::new_v4()),
            facility_id: Some(Uuid::new_v4()),
            orderable_id: Some(orderable_id),
            ..StockEventDto::default()
        };

        assert!(ApprovedOrderableValidator.validate(&event, &ctx).is_ok());
    }

    #[test]
    fn missing_program_or_facility_is_not_judged_here() {
        let ctx = EventContext::default();
        let event = StockEventDto {
            orderable_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        assert!(ApprovedOrderableValidator.validate(&event, &ctx).is_ok());
    }
}
