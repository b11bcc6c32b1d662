use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One orderable/lot row of a physical inventory. `quantity` is the counted
/// quantity; null means not counted yet (draft in progress).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "physical_inventory_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub physical_inventory_id: Uuid,
    pub orderable_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub vvm_status: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::physical_inventory::Entity",
        from = "Column::PhysicalInventoryId",
        to = "super::physical_inventory::Column::Id"
    )]
    PhysicalInventory,
    #[sea_orm(has_many = "super::stock_adjustment::Entity")]
    StockAdjustments,
}

impl Related<super::physical_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhysicalInventory.def()
    }
}

impl Related<super::stock_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockAdjustments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
