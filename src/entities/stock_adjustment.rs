use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A signed reconciliation entry for a physical inventory count: reason plus
/// non-negative magnitude. Attached either to a committed stock card line
/// item or to a draft physical inventory line item, never both.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub stock_card_line_item_id: Option<Uuid>,
    pub physical_inventory_line_item_id: Option<Uuid>,
    pub reason_id: Uuid,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_card_line_item::Entity",
        from = "Column::StockCardLineItemId",
        to = "super::stock_card_line_item::Column::Id"
    )]
    StockCardLineItem,
    #[sea_orm(
        belongs_to = "super::physical_inventory_line_item::Entity",
        from = "Column::PhysicalInventoryLineItemId",
        to = "super::physical_inventory_line_item::Column::Id"
    )]
    PhysicalInventoryLineItem,
    #[sea_orm(
        belongs_to = "super::stock_line_item_reason::Entity",
        from = "Column::ReasonId",
        to = "super::stock_line_item_reason::Column::Id"
    )]
    Reason,
}

impl Related<super::stock_card_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockCardLineItem.def()
    }
}

impl Related<super::physical_inventory_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhysicalInventoryLineItem.def()
    }
}

impl Related<super::stock_line_item_reason::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reason.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
