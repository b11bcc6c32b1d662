use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ledger per (facility, program, orderable, lot). Identity is immutable
/// after creation; line items are append-only. Stock on hand is never stored
/// on the card row, it is derived from the line items.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub origin_event_id: Uuid,
    pub facility_id: Uuid,
    pub program_id: Uuid,
    pub orderable_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_card_line_item::Entity")]
    LineItems,
    #[sea_orm(
        belongs_to = "super::stock_event::Entity",
        from = "Column::OriginEventId",
        to = "super::stock_event::Column::Id"
    )]
    OriginEvent,
}

impl Related<super::stock_card_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl Related<super::stock_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OriginEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
