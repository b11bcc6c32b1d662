use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A full-facility counted snapshot. At most one draft row per
/// (program, facility); submitted inventories keep `is_draft = false`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "physical_inventories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub program_id: Uuid,
    pub facility_id: Uuid,
    pub occurred_date: DateTimeUtc,
    pub document_number: Option<String>,
    pub signature: Option<String>,
    pub is_draft: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::physical_inventory_line_item::Entity")]
    LineItems,
}

impl Related<super::physical_inventory_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
