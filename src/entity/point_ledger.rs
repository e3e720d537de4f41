use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::account;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum PointReason {
  #[sea_orm(string_value = "REFERRAL")]
  #[default]
  Referral,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "point_ledger")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub account_id: i32,
  pub points: i32,
  pub reason: PointReason,
  pub created_at: DateTime,
  pub expires_at: DateTime,
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
