//! Permission checks delegated to the platform's authorization service. The
//! core calls the gate and propagates refusal without inspecting policy.

use crate::errors::{keys, ServiceError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

pub const STOCK_ADJUST: &str = "STOCK_ADJUST";
pub const STOCK_CARDS_VIEW: &str = "STOCK_CARDS_VIEW";
pub const STOCK_INVENTORIES_EDIT: &str = "STOCK_INVENTORIES_EDIT";
pub const MANAGE_STOCK_REASONS: &str = "MANAGE_STOCK_REASONS";

#[async_trait]
pub trait PermissionService: Send + Sync {
    /// Gate for a named right scoped to an optional program/facility pair.
    async fn check_right(
        &self,
        user_id: Uuid,
        right: &str,
        program_id: Option<Uuid>,
        facility_id: Option<Uuid>,
    ) -> Result<(), ServiceError>;

    async fn can_adjust_stock(
        &self,
        user_id: Uuid,
        program_id: Uuid,
        facility_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.check_right(user_id, STOCK_ADJUST, Some(program_id), Some(facility_id))
            .await
    }

    async fn can_view_stock_card(
        &self,
        user_id: Uuid,
        program_id: Uuid,
        facility_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.check_right(
            user_id,
            STOCK_CARDS_VIEW,
            Some(program_id),
            Some(facility_id),
        )
        .await
    }

    async fn can_edit_physical_inventory(
        &self,
        user_id: Uuid,
        program_id: Uuid,
        facility_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.check_right(
            user_id,
            STOCK_INVENTORIES_EDIT,
            Some(program_id),
            Some(facility_id),
        )
        .await
    }

    async fn can_manage_reasons(&self, user_id: Uuid) -> Result<(), ServiceError> {
        self.check_right(user_id, MANAGE_STOCK_REASONS, None, None)
            .await
    }
}

fn missing_permission(right: &str) -> ServiceError {
    ServiceError::PermissionDenied(format!(
        "{}: user lacks right {}",
        keys::ERROR_NO_FOLLOWING_PERMISSION,
        right
    ))
}

/// Client for the real authorization service.
pub struct HttpPermissionClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RightCheckResult {
    result: bool,
}

impl HttpPermissionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PermissionService for HttpPermissionClient {
    async fn check_right(
        &self,
        user_id: Uuid,
        right: &str,
        program_id: Option<Uuid>,
        facility_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut url = format!(
            "{}/api/users/{}/hasRight?rightName={}",
            self.base_url.trim_end_matches('/'),
            user_id,
            right
        );
        if let Some(program_id) = program_id {
            url.push_str(&format!("&programId={}", program_id));
        }
        if let Some(facility_id) = facility_id {
            url.push_str(&format!("&facilityId={}", facility_id));
        }
        debug!(%url, "permission check");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("authorization: {}", e)))?
            .error_for_status()
            .map_err(|e| ServiceError::ExternalServiceError(format!("authorization: {}", e)))?;

        let outcome = response.json::<RightCheckResult>().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("authorization decode: {}", e))
        })?;

        if outcome.result {
            Ok(())
        } else {
            Err(missing_permission(right))
        }
    }
}

/// Grants everything. Wired when no authorization URL is configured; only
/// suitable for tests and local development.
#[derive(Default)]
pub struct AllowAllPermissions;

#[async_trait]
impl PermissionService for AllowAllPermissions {
    async fn check_right(
        &self,
        _user_id: Uuid,
        _right: &str,
        _program_id: Option<Uuid>,
        _facility_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Denies a fixed set of rights; test double for permission failures.
#[derive(Default)]
pub struct DenyRights {
    pub denied: Vec<&'static str>,
}

#[async_trait]
impl PermissionService for DenyRights {
    async fn check_right(
        &self,
        _user_id: Uuid,
        right: &str,
        _program_id: Option<Uuid>,
        _facility_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        if self.denied.iter().any(|denied| *denied == right) {
            Err(missing_permission(right))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deny_rights_blocks_only_listed_rights() {
        let permissions = DenyRights {
            denied: vec![STOCK_ADJUST],
        };
        let user = Uuid::new_v4();

        let err = permissions
            .can_adjust_stock(user, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));

        assert!(permissions.can_manage_reasons(user).await.is_ok());
    }
}
