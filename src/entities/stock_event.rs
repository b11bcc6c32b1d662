use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The immutable record of a submitted movement request. Never mutated after
/// commit; the derived stock card line item references it as origin.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quantity: i32,
    pub reason_id: Option<Uuid>,
    pub facility_id: Uuid,
    pub program_id: Uuid,
    pub orderable_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub user_id: Uuid,
    pub source_node_id: Option<Uuid>,
    pub destination_node_id: Option<Uuid>,
    pub occurred_date: DateTimeUtc,
    pub noticed_date: DateTimeUtc,
    pub saved_date: DateTimeUtc,
    pub signature: Option<String>,
    pub reason_free_text: Option<String>,
    pub source_free_text: Option<String>,
    pub destination_free_text: Option<String>,
    pub document_number: Option<String>,
    pub is_physical_inventory: bool,
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
