use crate::dto::StockEventDto;
use crate::errors::{keys, ServiceError};
use crate::services::context::EventContext;
use crate::validators::StockEventValidator;

/// Free text is only allowed where something accepts it: a reason flagged
/// `isFreeTextAllowed`, or a source/destination that is a local organization
/// rather than a reference-data facility.
pub struct FreeTextValidator;

impl StockEventValidator for FreeTextValidator {
    fn name(&self) -> &'static str {
        "free_text"
    }

    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError> {
        if event.reason_free_text.is_some() {
            let allowed = match (&event.reason_id, &ctx.reason) {
                (None, _) => false,
                (Some(_), Some(reason)) => reason.is_free_text_allowed,
                // Unknown reason id: the assignment validator owns that
                // rejection, free text is not judged against a ghost.
                (Some(_), None) => true,
            };
            if !allowed {
                return Err(ServiceError::validation(
                    keys::ERROR_REASON_FREE_TEXT_NOT_ALLOWED,
                    "reason free text is not allowed for this reason",
                ));
            }
        }

        if event.source_free_text.is_some() {
            let allowed = match (&event.source_id, &ctx.source_node) {
                (None, _) => false,
                (Some(_), Some(node)) => !node.is_ref_data_facility,
                (Some(_), None) => true,
            };
            if !allowed {
                return Err(ServiceError::validation(
                    keys::ERROR_SOURCE_FREE_TEXT_NOT_ALLOWED,
                    "source free text is not allowed for this source",
                ));
            }
        }

        if event.destination_free_text.is_some() {
            let allowed = match (&event.destination_id, &ctx.destination_node) {
                (None, _) => false,
                (Some(_), Some(node)) => !node.is_ref_data_facility,
                (Some(_), None) => true,
            };
            if !allowed {
                return Err(ServiceError::validation(
                    keys::ERROR_DESTINATION_FREE_TEXT_NOT_ALLOWED,
                    "destination free text is not allowed for this destination",
                ));
            }
        }

        Ok(())
    }
}
