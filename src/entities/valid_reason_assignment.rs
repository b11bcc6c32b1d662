use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Admin-configured reason whitelist entry for a program and facility type.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "valid_reason_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub program_id: Uuid,
    pub facility_type_id: Uuid,
    pub reason_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_line_item_reason::Entity",
        from = "Column::ReasonId",
        to = "super::stock_line_item_reason::Column::Id"
    )]
    Reason,
}

impl Related<super::stock_line_item_reason::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reason.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
