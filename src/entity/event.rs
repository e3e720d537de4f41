use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::booking;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  #[sea_orm(column_type = "Text")]
  pub description: String,
  pub price: i32,
  pub start_date: DateTime,
  pub end_date: DateTime,
  pub location: String,
  pub category: String,
  pub available_seats: i32,
  /// Seat count at creation; `available_seats` plus booked quantities
  /// always adds up to this.
  pub capacity: i32,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "booking::Entity")]
  Bookings,
}

impl Related<booking::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Bookings.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
