use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{account, event};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub account_id: i32,
  pub event_id: i32,
  pub quantity: i32,
  pub total_cost: i64,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "account::Entity",
    from = "Column::AccountId",
    to = "account::Column::Id"
  )]
  Account,
  #[sea_orm(
    belongs_to = "event::Entity",
    from = "Column::EventId",
    to = "event::Column::Id"
  )]
  Event,
}

impl Related<account::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Account.def()
  }
}

impl Related<event::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Event.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
