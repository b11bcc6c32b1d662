use crate::entities::stock_line_item_reason;
use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Whether a reason adds to, removes from, or reconciles a balance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonType {
    Credit,
    Debit,
    BalanceAdjustment,
}

/// Business grouping of a reason.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCategory {
    PhysicalInventory,
    Adjustment,
    AdHoc,
    Transfer,
}

/// Catalog entry classifying a movement's business cause. Business meaning is
/// immutable once referenced by historical line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub reason_type: ReasonType,
    pub reason_category: ReasonCategory,
    pub is_free_text_allowed: bool,
}

impl Reason {
    pub fn is_credit(&self) -> bool {
        self.reason_type == ReasonType::Credit
    }

    pub fn is_debit(&self) -> bool {
        self.reason_type == ReasonType::Debit
    }

    pub fn is_adjustment_category(&self) -> bool {
        self.reason_category == ReasonCategory::Adjustment
    }

    /// Business equality: every field except the id. Used for idempotent
    /// reason creation.
    pub fn same_business_meaning(&self, other: &Reason) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.reason_type == other.reason_type
            && self.reason_category == other.reason_category
            && self.is_free_text_allowed == other.is_free_text_allowed
    }
}

impl TryFrom<stock_line_item_reason::Model> for Reason {
    type Error = ServiceError;

    fn try_from(model: stock_line_item_reason::Model) -> Result<Self, Self::Error> {
        let reason_type = model.reason_type.parse::<ReasonType>().map_err(|_| {
            ServiceError::Internal(format!(
                "unknown reason type '{}' on reason {}",
                model.reason_type, model.id
            ))
        })?;
        let reason_category = model.reason_category.parse::<ReasonCategory>().map_err(|_| {
            ServiceError::Internal(format!(
                "unknown reason category '{}' on reason {}",
                model.reason_category, model.id
            ))
        })?;
        Ok(Reason {
            id: model.id,
            name: model.name,
            description: model.description,
            reason_type,
            reason_category,
            is_free_text_allowed: model.is_free_text_allowed,
        })
    }
}

impl From<&Reason> for stock_line_item_reason::Model {
    fn from(reason: &Reason) -> Self {
        stock_line_item_reason::Model {
            id: reason.id,
            name: reason.name.clone(),
            description: reason.description.clone(),
            reason_type: reason.reason_type.to_string(),
            reason_category: reason.reason_category.to_string(),
            is_free_text_allowed: reason.is_free_text_allowed,
        }
    }
}

/// Fixed ids for the built-in physical inventory reasons, seeded at startup
/// so reconciliation adjustments always have a reason to reference.
pub const PHYSICAL_CREDIT_REASON_ID: Uuid =
    Uuid::from_u128(0x6f8e_0f0a_4b2d_4c8e_9a1f_2d3c4b5a6f70);
pub const PHYSICAL_DEBIT_REASON_ID: Uuid =
    Uuid::from_u128(0x6f8e_0f0a_4b2d_4c8e_9a1f_2d3c4b5a6f71);
pub const PHYSICAL_BALANCE_REASON_ID: Uuid =
    Uuid::from_u128(0x6f8e_0f0a_4b2d_4c8e_9a1f_2d3c4b5a6f72);

/// Inventory correction in case of overstock.
pub fn physical_credit() -> Reason {
    Reason {
        id: PHYSICAL_CREDIT_REASON_ID,
        name: "Overstock".to_string(),
        description: Some("Inventory correction in case of overstock".to_string()),
        reason_type: ReasonType::Credit,
        reason_category: ReasonCategory::PhysicalInventory,
        is_free_text_allowed: false,
    }
}

/// Inventory correction in case of understock.
pub fn physical_debit() -> Reason {
    Reason {
        id: PHYSICAL_DEBIT_REASON_ID,
        name: "Understock".to_string(),
        description: Some("Inventory correction in case of understock".to_string()),
        reason_type: ReasonType::Debit,
        reason_category: ReasonCategory::PhysicalInventory,
        is_free_text_allowed: false,
    }
}

pub fn physical_balance() -> Reason {
    Reason {
        id: PHYSICAL_BALANCE_REASON_ID,
        name: "Balance adjustment".to_string(),
        description: Some("Balance adjustment".to_string()),
        reason_type: ReasonType::BalanceAdjustment,
        reason_category: ReasonCategory::PhysicalInventory,
        is_free_text_allowed: false,
    }
}

pub fn built_in_reasons() -> Vec<Reason> {
    vec![physical_credit(), physical_debit(), physical_balance()]
}
