use crate::dto::StockEventDto;
use crate::errors::{keys, ServiceError};
use crate::services::context::EventContext;
use crate::validators::StockEventValidator;

/// Users cannot issue to or receive from arbitrary endpoints: the node must
/// come from the valid list configured for the program and facility type.
/// A line naming both a source and a destination is always rejected.
pub struct SourceDestinationAssignmentValidator;

impl StockEventValidator for SourceDestinationAssignmentValidator {
    fn name(&self) -> &'static str {
        "source_destination_assignment"
    }

    fn validate(&self, event: &StockEventDto, ctx: &EventContext) -> Result<(), ServiceError> {
        if let (Some(source_id), Some(destination_id)) = (event.source_id, event.destination_id) {
            return Err(ServiceError::validation(
                keys::ERROR_SOURCE_DESTINATION_BOTH_PRESENT,
                format!(
                    "source {} and destination {} cannot both be present",
                    source_id, destination_id
                ),
            ));
        }

        // Missing program or facility is judged by the mandatory-fields and
        // reference-data checks, not here.
        if ctx.program.is_none() || ctx.facility.is_none() {
            return Ok(());
        }

        if let Some(source_id) = event.source_id {
            if !ctx.valid_source_node_ids.contains(&source_id) {
                return Err(ServiceError::validation(
                    keys::ERROR_SOURCE_NOT_IN_VALID_LIST,
                    format!("source {} is not in the configured valid list", source_id),
                ));
            }
        }

        if let Some(destination_id) = event.destination_id {
            if !ctx.valid_destination_node_ids.contains(&destination_id) {
                return Err(ServiceError::validation(
                    keys::ERROR_DESTINATION_NOT_IN_VALID_LIST,
                    format!(
                        "destination {} is not in the configured valid list",
                        destination_id
                    ),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reference_data::{FacilityInfo, ProgramInfo};
    use uuid::Uuid;

    fn ctx_with_program_and_facility() -> EventContext {
        let mut ctx = EventContext::default();
        ctx.program = Some(ProgramInfo {
            id: Uuid::new_v4(),
            name: "EPI".to_string(),
        });
        ctx.facility = Some(FacilityInfo {
            id: Uuid::new_v4(),
            name: "Balaka District Hospital".to_string(),
            facility_type_id: Uuid::new_v4(),
        });
        ctx
    }

    #[test]
    fn both_source_and_destination_is_rejected() {
        let ctx = ctx_with_program_and_facility();
        let event = StockEventDto {
            source_id: Some(Uuid::new_v4()),
            destination_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        let err = SourceDestinationAssignmentValidator
            .validate(&event, &ctx)
            .unwrap_err();
        assert_eq!(
            err.validation_key(),
            Some(keys::ERROR_SOURCE_DESTINATION_BOTH_PRESENT)
        );
    }

    #[test]
    fn unlisted_source_is_rejected() {
        let mut ctx = ctx_with_program_and_facility();
        ctx.valid_source_node_ids.insert(Uuid::new_v4());
        let event = StockEventDto {
            source_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        let err = SourceDestinationAssignmentValidator
            .validate(&event, &ctx)
            .unwrap_err();
        assert_eq!(
            err.validation_key(),
            Some(keys::ERROR_SOURCE_NOT_IN_VALID_LIST)
        );
    }

    #[test]
    fn listed_destination_passes() {
        let destination_id = Uuid::new_v4();
        let mut ctx = ctx_with_program_and_facility();
        ctx.valid_destination_node_ids.insert(destination_id);
        let event = StockEventDto {
            destination_id: Some(destination_id),
            ..StockEventDto::default()
        };

        assert!(SourceDestinationAssignmentValidator
            .validate(&event, &ctx)
            .is_ok());
    }

    #[test]
    fn assignment_check_waits_for_known_program_and_facility() {
        // The facility was not found in reference data; other validators own
        // that failure.
        let ctx = EventContext::default();
        let event = StockEventDto {
            destination_id: Some(Uuid::new_v4()),
            ..StockEventDto::default()
        };

        assert!(SourceDestinationAssignmentValidator
            .validate(&event, &ctx)
            .is_ok());
    }
}
