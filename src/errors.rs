use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable machine-readable keys for validation failures. Clients and the
/// localization layer key off these; the English message is a convenience.
pub mod keys {
    pub const ERROR_EVENT_PROGRAM_INVALID: &str = "stockmanagement.error.event.programId.invalid";
    pub const ERROR_EVENT_FACILITY_INVALID: &str =
        "stockmanagement.error.event.facilityId.invalid";
    pub const ERROR_EVENT_ORDERABLE_INVALID: &str =
        "stockmanagement.error.event.orderableId.invalid";
    pub const ERROR_EVENT_OCCURRED_DATE_INVALID: &str =
        "stockmanagement.error.event.occurredDate.invalid";
    pub const ERROR_EVENT_QUANTITY_INVALID: &str = "stockmanagement.error.event.quantity.invalid";
    pub const ERROR_EVENT_MOVEMENT_KIND_MISSING: &str =
        "stockmanagement.error.event.reasonOrSourceOrDestination.missing";

    pub const ERROR_EVENT_ORDERABLE_NOT_APPROVED: &str =
        "stockmanagement.error.event.orderable.notApproved";
    pub const ERROR_ORDERABLE_DISABLED_VVM: &str =
        "stockmanagement.error.event.orderable.disabledVvm";

    pub const ERROR_SOURCE_DESTINATION_BOTH_PRESENT: &str =
        "stockmanagement.error.sourceAndDestination.bothPresent";
    pub const ERROR_SOURCE_NOT_IN_VALID_LIST: &str =
        "stockmanagement.error.source.notInValidList";
    pub const ERROR_DESTINATION_NOT_IN_VALID_LIST: &str =
        "stockmanagement.error.destination.notInValidList";
    pub const ERROR_REASON_NOT_IN_VALID_LIST: &str =
        "stockmanagement.error.reason.notInValidList";

    pub const ERROR_EVENT_ADJUSTMENT_REASON_TYPE_INVALID: &str =
        "stockmanagement.error.event.adjustment.reasonType.invalid";
    pub const ERROR_EVENT_ADJUSTMENT_REASON_CATEGORY_INVALID: &str =
        "stockmanagement.error.event.adjustment.reasonCategory.invalid";

    pub const ERROR_REASON_FREE_TEXT_NOT_ALLOWED: &str =
        "stockmanagement.error.reasonFreeText.notAllowed";
    pub const ERROR_SOURCE_FREE_TEXT_NOT_ALLOWED: &str =
        "stockmanagement.error.sourceFreeText.notAllowed";
    pub const ERROR_DESTINATION_FREE_TEXT_NOT_ALLOWED: &str =
        "stockmanagement.error.destinationFreeText.notAllowed";

    pub const ERROR_EVENT_DEBIT_QUANTITY_EXCEEDS_SOH: &str =
        "stockmanagement.error.event.debit.quantityExceedsStockOnHand";
    pub const ERROR_EVENT_SOH_EXCEEDS_UPPER_LIMIT: &str =
        "stockmanagement.error.event.stockOnHand.exceedsUpperLimit";

    pub const ERROR_ADJUSTMENT_QUANTITY_INVALID: &str =
        "stockmanagement.error.adjustment.quantity.invalid";
    pub const ERROR_PHYSICAL_INVENTORY_STOCK_ADJUSTMENTS_NOT_PROVIDED: &str =
        "stockmanagement.error.physicalInventory.stockAdjustments.notProvided";
    pub const ERROR_PHYSICAL_INVENTORY_SOH_DIFFER: &str =
        "stockmanagement.error.physicalInventory.stockOnHand.currentStockDiffer";
    pub const ERROR_PHYSICAL_INVENTORY_LINE_ITEMS_MISSING: &str =
        "stockmanagement.error.physicalInventory.lineItems.missing";
    pub const ERROR_PHYSICAL_INVENTORY_ORDERABLE_MISSING: &str =
        "stockmanagement.error.physicalInventory.orderable.missing";
    pub const ERROR_PHYSICAL_INVENTORY_ORDERABLE_DUPLICATED: &str =
        "stockmanagement.error.physicalInventory.orderable.duplicated";
    pub const ERROR_PHYSICAL_INVENTORY_ACTIVE_CARD_NOT_COVERED: &str =
        "stockmanagement.error.physicalInventory.notIncludeActiveStockCard";

    pub const ERROR_PROGRAM_NOT_FOUND: &str = "stockmanagement.error.program.notFound";
    pub const ERROR_FACILITY_NOT_FOUND: &str = "stockmanagement.error.facility.notFound";
    pub const ERROR_ORDERABLE_NOT_FOUND: &str = "stockmanagement.error.orderable.notFound";
    pub const ERROR_REASON_NOT_FOUND: &str = "stockmanagement.error.reason.notFound";

    pub const ERROR_NO_FOLLOWING_PERMISSION: &str =
        "stockmanagement.error.authorization.noFollowingPermission";
}

/// Error body returned by every handler.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Bad Request", "Forbidden")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Stable machine-readable key for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_key: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        key: &'static str,
        message: String,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::DatabaseError(error.into_db_err())
    }

    /// A validation rejection with its stable key.
    pub fn validation(key: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            key,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation { .. })
    }

    pub fn validation_key(&self) -> Option<&'static str> {
        match self {
            ServiceError::Validation { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            message_key: self.validation_key().map(str::to_string),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::validation(keys::ERROR_EVENT_QUANTITY_INVALID, "x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::PermissionDenied("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::ExternalServiceError("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ServiceError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::Internal("reflection copy blew up".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::db_error("connection reset").response_message(),
            "Database error"
        );
        assert_eq!(
            ServiceError::validation(keys::ERROR_EVENT_QUANTITY_INVALID, "quantity is negative")
                .response_message(),
            "quantity is negative"
        );
    }

    #[tokio::test]
    async fn validation_response_carries_message_key() {
        let response = ServiceError::validation(
            keys::ERROR_EVENT_DEBIT_QUANTITY_EXCEEDS_SOH,
            "debit quantity exceeds stock on hand",
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            payload.message_key.as_deref(),
            Some(keys::ERROR_EVENT_DEBIT_QUANTITY_EXCEEDS_SOH)
        );
    }
}
