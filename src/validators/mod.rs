//! Stock event validation pipeline.
//!
//! Validators are independent, synchronous checks over a pre-loaded
//! [`EventContext`]; none of them touch persisted state. The chain is
//! fail-fast: the first rejection aborts, later validators never run. The
//! order is the declared list in [`default_validators`] — cheap field checks
//! first, the speculative recalculation last.

use crate::dto::StockEventDto;
use crate::errors::ServiceError;
use crate::services::context::EventContext;
use tracing::debug;

mod adjustment_reason;
mod approved_orderable;
mod free_text;
mod mandatory_fields;
mod physical_inventory;
mod quantity;
mod reason_assignment;
mod source_destination;
mod vvm;

pub use adjustment_reason::AdjustmentReasonValidator;
pub use approved_orderable::ApprovedOrderableValidator;
pub use free_text::FreeTextValidator;
pub use mandatory_fields::MandatoryFieldsValidator;
pub use physical_inventory::PhysicalInventoryReconciliationValidator;
pub use quantity::QuantityValidator;
pub use reason_assignment::ReasonAssignmentValidator;
pub use source_destination::SourceDestinationAssignmentValidator;
pub use vvm::VvmValidator;

pub trait StockEventValidator: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError>;
}

/// The validation order. Owned here, not by any wiring: later validators may
/// assume the invariants of earlier ones (a reason exists before its category
/// is judged, identity fields exist before the ledger is recalculated).
pub fn default_validators() -> Vec<Box<dyn StockEventValidator>> {
    vec![
        Box::new(MandatoryFieldsValidator),
        Box::new(VvmValidator),
        Box::new(ApprovedOrderableValidator),
        Box::new(SourceDestinationAssignmentValidator),
        Box::new(ReasonAssignmentValidator),
        Box::new(AdjustmentReasonValidator),
        Box::new(FreeTextValidator),
        Box::new(QuantityValidator),
        Box::new(PhysicalInventoryReconciliationValidator),
    ]
}

/// Run the chain; the first failure wins.
pub fn run_chain(
    validators: &[Box<dyn StockEventValidator>],
    event: &StockEventDto,
    ctx: &EventContext,
) -> Result<(), ServiceError> {
    for validator in validators {
        debug!(validator = validator.name(), "validating stock event");
        validator.validate(event, ctx)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::keys;

    struct AlwaysFails;
    impl StockEventValidator for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }
        fn validate(&self, _: &StockEventDto, _: &EventContext) -> Result<(), ServiceError> {
            Err(ServiceError::validation(
                keys::ERROR_EVENT_QUANTITY_INVALID,
                "boom",
            ))
        }
    }

    struct Panics;
    impl StockEventValidator for Panics {
        fn name(&self) -> &'static str {
            "panics"
        }
        fn validate(&self, _: &StockEventDto, _: &EventContext) -> Result<(), ServiceError> {
            panic!("later validators must never run after a rejection");
        }
    }

    #[test]
    fn chain_is_fail_fast() {
        let validators: Vec<Box<dyn StockEventValidator>> =
            vec![Box::new(AlwaysFails), Box::new(Panics)];
        let event = StockEventDto::default();
        let ctx = EventContext::default();

        let err = run_chain(&validators, &event, &ctx).unwrap_err();
        assert_eq!(
            err.validation_key(),
            Some(keys::ERROR_EVENT_QUANTITY_INVALID)
        );
    }

    #[test]
    fn default_order_starts_cheap_and_ends_with_recalculation() {
        let names: Vec<&str> = default_validators()
            .iter()
            .map(|validator| validator.name())
            .collect();
        assert_eq!(names.first(), Some(&"mandatory_fields"));
        assert_eq!(
            &names[names.len() - 2..],
            &["quantity", "physical_inventory_reconciliation"]
        );
    }
}
