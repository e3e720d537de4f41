use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{booking, coupon, point_ledger};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountRole {
  #[sea_orm(string_value = "CUSTOMER")]
  #[default]
  Customer,
  #[sea_orm(string_value = "ORGANIZER")]
  Organizer,
}

impl std::str::FromStr for AccountRole {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "CUSTOMER" => Ok(Self::Customer),
      "ORGANIZER" => Ok(Self::Organizer),
      _ => Err(()),
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  #[sea_orm(unique)]
  pub email: String,
  #[serde(skip_serializing)]
  pub password: String,
  pub first_name: String,
  pub last_name: String,
  pub is_verified: bool,
  pub role: AccountRole,
  #[sea_orm(unique)]
  pub referral_code: String,
  pub referred_by: Option<String>,
  pub points: i32,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "point_ledger::Entity")]
  PointLedger,
  #[sea_orm(has_many = "coupon::Entity")]
  Coupons,
  #[sea_orm(has_many = "booking::Entity")]
  Bookings,
}

impl Related<point_ledger::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PointLedger.def()
  }
}

impl Related<coupon::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Coupons.def()
  }
}

impl Related<booking::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Bookings.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
