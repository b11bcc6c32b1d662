use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One committed movement on a stock card. Immutable once persisted.
///
/// `occurred_date` is business time (when the movement physically happened),
/// `processed_date` is record time and breaks ties between same-day entries.
/// `stock_on_hand` is the running balance after this movement; it is written
/// at append time and can always be re-derived from the item history.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_card_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub stock_card_id: Uuid,
    pub origin_event_id: Uuid,
    pub quantity: i32,
    pub reason_id: Option<Uuid>,
    pub source_node_id: Option<Uuid>,
    pub destination_node_id: Option<Uuid>,
    pub occurred_date: DateTimeUtc,
    pub processed_date: DateTimeUtc,
    pub user_id: Uuid,
    pub stock_on_hand: i32,
    pub reason_free_text: Option<String>,
    pub source_free_text: Option<String>,
    pub destination_free_text: Option<String>,
    pub document_number: Option<String>,
    pub signature: Option<String>,
    pub vvm_status: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_card::Entity",
        from = "Column::StockCardId",
        to = "super::stock_card::Column::Id"
    )]
    StockCard,
    #[sea_orm(
        belongs_to = "super::stock_line_item_reason::Entity",
        from = "Column::ReasonId",
        to = "super::stock_line_item_reason::Column::Id"
    )]
    Reason,
    #[sea_orm(has_many = "super::stock_adjustment::Entity")]
    StockAdjustments,
}

impl Related<super::stock_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockCard.def()
    }
}

impl Related<super::stock_line_item_reason::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reason.def()
    }
}

impl Related<super::stock_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockAdjustments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
