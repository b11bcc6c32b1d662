use crate::dto::StockEventDto;
use crate::errors::{keys, ServiceError};
use crate::services::context::EventContext;
use crate::validators::StockEventValidator;

/// Rejects vaccine vial monitor status on orderables that have the feature
/// disabled. An unknown orderable is left for the approved-product check.
pub struct VvmValidator;

impl StockEventValidator for VvmValidator {
    fn name(&self) -> &'static str {
        "vvm_status"
    }

    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError> {
        if event.vvm_status.is_none() {
            return Ok(());
        }

        if let Some(orderable) = &ctx.orderable {
            if !orderable.use_vvm {
                return Err(ServiceError::validation(
                    keys::ERROR_ORDERABLE_DISABLED_VVM,
                    format!(
                        "orderable {} does not use vaccine vial monitors",
                        orderable.id
                    ),
                ));
            }
        }

        Ok(())
    }
}
