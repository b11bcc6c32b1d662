use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A movement endpoint: either a reference-data facility or a local
/// organization, discriminated by `is_ref_data_facility`. The domain-side sum
/// type is `crate::models::node::NodeRef`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nodes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reference_id: Uuid,
    pub is_ref_data_facility: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
