//! Valid source/destination catalogs and movement endpoint display
//! resolution. Users pick endpoints from lists an admin configured per
//! program and facility type; they cannot issue to or receive from arbitrary
//! places.

use crate::db::DbPool;
use crate::dto::{NodeDisplayDto, ValidAssignmentDto};
use crate::entities::{node, organization, valid_destination_assignment, valid_source_assignment};
use crate::errors::ServiceError;
use crate::models::NodeRef;
use crate::services::reference_data::ReferenceDataService;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Resolve a node's display data: reference data for facilities, the local
/// organizations table otherwise. An unknown node resolves to `None`.
pub(crate) async fn resolve_node_display<C: ConnectionTrait>(
    db: &C,
    reference_data: &dyn ReferenceDataService,
    node_id: Uuid,
) -> Result<Option<NodeDisplayDto>, ServiceError> {
    let Some(node_model) = node::Entity::find_by_id(node_id).one(db).await? else {
        return Ok(None);
    };

    match NodeRef::from_entity(&node_model) {
        NodeRef::RefDataFacility(facility_id) => {
            debug!(%facility_id, "resolving node display from reference data");
            Ok(reference_data
                .find_facility(facility_id)
                .await?
                .map(|facility| NodeDisplayDto {
                    node_id,
                    name: facility.name,
                    is_ref_data_facility: true,
                }))
        }
        NodeRef::Organization(organization_id) => Ok(organization::Entity::find_by_id(
            organization_id,
        )
        .one(db)
        .await?
        .map(|organization| NodeDisplayDto {
            node_id,
            name: organization.name,
            is_ref_data_facility: false,
        })),
    }
}

#[derive(Clone)]
pub struct SourceDestinationService {
    db: Arc<DbPool>,
    reference_data: Arc<dyn ReferenceDataService>,
}

impl SourceDestinationService {
    pub fn new(db: Arc<DbPool>, reference_data: Arc<dyn ReferenceDataService>) -> Self {
        Self { db, reference_data }
    }

    pub async fn valid_sources(
        &self,
        program_id: Uuid,
        facility_type_id: Uuid,
    ) -> Result<Vec<ValidAssignmentDto>, ServiceError> {
        let assignments = valid_source_assignment::Entity::find()
            .filter(valid_source_assignment::Column::ProgramId.eq(program_id))
            .filter(valid_source_assignment::Column::FacilityTypeId.eq(facility_type_id))
            .all(self.db.as_ref())
            .await?;

        let mut results = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            results.push(
                self.to_assignment_dto(
                    assignment.id,
                    assignment.program_id,
                    assignment.facility_type_id,
                    assignment.node_id,
                )
                .await?,
            );
        }
        Ok(results)
    }

    pub async fn valid_destinations(
        &self,
        program_id: Uuid,
        facility_type_id: Uuid,
    ) -> Result<Vec<ValidAssignmentDto>, ServiceError> {
        let assignments = valid_destination_assignment::Entity::find()
            .filter(valid_destination_assignment::Column::ProgramId.eq(program_id))
            .filter(valid_destination_assignment::Column::FacilityTypeId.eq(facility_type_id))
            .all(self.db.as_ref())
            .await?;

        let mut results = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            results.push(
                self.to_assignment_dto(
                    assignment.id,
                    assignment.program_id,
                    assignment.facility_type_id,
                    assignment.node_id,
                )
                .await?,
            );
        }
        Ok(results)
    }

    async fn to_assignment_dto(
        &self,
        id: Uuid,
        program_id: Uuid,
        facility_type_id: Uuid,
        node_id: Uuid,
    ) -> Result<ValidAssignmentDto, ServiceError> {
        let display =
            resolve_node_display(self.db.as_ref(), self.reference_data.as_ref(), node_id).await?;
        Ok(ValidAssignmentDto {
            id,
            program_id,
            facility_type_id,
            node_id,
            is_ref_data_facility: display
                .as_ref()
                .map(|display| display.is_ref_data_facility)
                .unwrap_or(false),
            name: display.map(|display| display.name),
        })
    }
}
