use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog entry classifying a movement's business cause. Stored with the
/// type and category as strings; the typed view lives in
/// `crate::models::reason`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_line_item_reasons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub reason_type: String,
    pub reason_category: String,
    pub is_free_text_allowed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
