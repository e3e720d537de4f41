use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::account;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub account_id: i32,
  #[sea_orm(unique)]
  pub code: String,
  pub discount_percent: i32,
  pub expires_at: DateTime,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "account::Entity",
    from = "Column::AccountId",
    to = "account::Column::Id"
  )]
  Account,
}

impl Related<account::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Account.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
