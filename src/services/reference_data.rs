//! Read-only lookups against the platform's reference data service:
//! facilities, programs, orderables, and the approved-product list. The core
//! treats "not found" as data for validators, never as a crash.

use crate::errors::ServiceError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacilityInfo {
    pub id: Uuid,
    pub name: String,
    pub facility_type_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInfo {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderableInfo {
    pub id: Uuid,
    pub product_code: String,
    pub full_product_name: String,
    /// Whether vaccine vial monitor status may be recorded for this product.
    #[serde(default)]
    pub use_vvm: bool,
}

#[async_trait]
pub trait ReferenceDataService: Send + Sync {
    async fn find_facility(&self, id: Uuid) -> Result<Option<FacilityInfo>, ServiceError>;
    async fn find_program(&self, id: Uuid) -> Result<Option<ProgramInfo>, ServiceError>;
    async fn find_orderable(&self, id: Uuid) -> Result<Option<OrderableInfo>, ServiceError>;
    /// The approved-product list for a program at a facility.
    async fn approved_orderables(
        &self,
        program_id: Uuid,
        facility_id: Uuid,
    ) -> Result<Vec<OrderableInfo>, ServiceError>;
}

/// Client for the real reference data service.
pub struct HttpReferenceDataClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpReferenceDataClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ServiceError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(%url, "reference data lookup");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("reference data: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status().map_err(|e| {
            ServiceError::ExternalServiceError(format!("reference data: {}", e))
        })?;
        let body = response.json::<T>().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("reference data decode: {}", e))
        })?;
        Ok(Some(body))
    }
}

#[async_trait]
impl ReferenceDataService for HttpReferenceDataClient {
    async fn find_facility(&self, id: Uuid) -> Result<Option<FacilityInfo>, ServiceError> {
        self.get_optional(&format!("/api/facilities/{}", id)).await
    }

    async fn find_program(&self, id: Uuid) -> Result<Option<ProgramInfo>, ServiceError> {
        self.get_optional(&format!("/api/programs/{}", id)).await
    }

    async fn find_orderable(&self, id: Uuid) -> Result<Option<OrderableInfo>, ServiceError> {
        self.get_optional(&format!("/api/orderables/{}", id)).await
    }

    async fn approved_orderables(
        &self,
        program_id: Uuid,
        facility_id: Uuid,
    ) -> Result<Vec<OrderableInfo>, ServiceError> {
        let found: Option<Vec<OrderableInfo>> = self
            .get_optional(&format!(
                "/api/facilities/{}/approvedProducts?programId={}",
                facility_id, program_id
            ))
            .await?;
        Ok(found.unwrap_or_default())
    }
}

/// In-memory reference data store for tests and local development (wired when
/// no reference data URL is configured).
#[derive(Default)]
pub struct InMemoryReferenceData {
    facilities: DashMap<Uuid, FacilityInfo>,
    programs: DashMap<Uuid, ProgramInfo>,
    orderables: DashMap<Uuid, OrderableInfo>,
    approved: DashMap<(Uuid, Uuid), Vec<Uuid>>,
}

impl InMemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_facility(&self, facility: FacilityInfo) {
        self.facilities.insert(facility.id, facility);
    }

    pub fn put_program(&self, program: ProgramInfo) {
        self.programs.insert(program.id, program);
    }

    pub fn put_orderable(&self, orderable: OrderableInfo) {
        self.orderables.insert(orderable.id, orderable);
    }

    /// Add an orderable to the approved-product list for a program/facility.
    pub fn approve(&self, program_id: Uuid, facility_id: Uuid, orderable_id: Uuid) {
        self.approved
            .entry((program_id, facility_id))
            .or_default()
            .push(orderable_id);
    }
}

#[async_trait]
impl ReferenceDataService for InMemoryReferenceData {
    async fn find_facility(&self, id: Uuid) -> Result<Option<FacilityInfo>, ServiceError> {
        Ok(self.facilities.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_program(&self, id: Uuid) -> Result<Option<ProgramInfo>, ServiceError> {
        Ok(self.programs.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_orderable(&self, id: Uuid) -> Result<Option<OrderableInfo>, ServiceError> {
        Ok(self.orderables.get(&id).map(|entry| entry.value().clone()))
    }

    async fn approved_orderables(
        &self,
        program_id: Uuid,
        facility_id: Uuid,
    ) -> Result<Vec<OrderableInfo>, ServiceError> {
        let ids = self
            .approved
            .get(&(program_id, facility_id))
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        Ok(ids
            .into_iter()
            .filter_map(|id| self.orderables.get(&id).map(|entry| entry.value().clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryReferenceData::new();
        let program_id = Uuid::new_v4();
        let facility_id = Uuid::new_v4();
        let orderable_id = Uuid::new_v4();

        store.put_program(ProgramInfo {
            id: program_id,
            name: "Essential Medicines".to_string(),
        });
        store.put_orderable(OrderableInfo {
            id: orderable_id,
            product_code: "ORS-200".to_string(),
            full_product_name: "Oral rehydration salts".to_string(),
            use_vvm: false,
        });
        store.approve(program_id, facility_id, orderable_id);

        assert!(store.find_program(program_id).await.unwrap().is_some());
        assert!(store.find_facility(facility_id).await.unwrap().is_none());
        let approved = store
            .approved_orderables(program_id, facility_id)
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, orderable_id);
    }
}
