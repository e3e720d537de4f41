use json::Value;
use serde::Deserialize;

use crate::{
  entity::event,
  prelude::*,
  utils::{non_negative, parse_date, required_int, required_str},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventReq {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<Value>,
  pub start_date: Option<String>,
  pub end_date: Option<String>,
  pub location: Option<String>,
  pub category: Option<String>,
  pub available_seats: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
  pub name: String,
  pub description: String,
  pub price: i32,
  pub start_date: DateTime,
  pub end_date: DateTime,
  pub location: String,
  pub category: String,
  pub available_seats: i32,
}

impl NewEventReq {
  /// Presence first, then dates, then the date range, then quantities.
  pub fn validate(self) -> Result<NewEvent> {
    let name = required_str(self.name, "name")?;
    let description = required_str(self.description, "description")?;
    let price = required_int(self.price.as_ref(), "price")?;
    let start_date = required_str(self.start_date, "startDate")?;
    let end_date = required_str(self.end_date, "endDate")?;
    let location = required_str(self.location, "location")?;
    let category = required_str(self.category, "category")?;
    let available_seats =
      required_int(self.available_seats.as_ref(), "availableSeats")?;

    let start_date = parse_date(&start_date)?;
    let end_date = parse_date(&end_date)?;
    if end_date < start_date {
      return Err(Error::InvalidRange);
    }

    Ok(NewEvent {
      name,
      description,
      price: non_negative(price, "price")?,
      start_date,
      end_date,
      location,
      category,
      available_seats: non_negative(available_seats, "availableSeats")?,
    })
  }
}

pub struct Events<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Events<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(&self, new: NewEvent) -> Result<event::Model> {
    let event = event::ActiveModel {
      id: NotSet,
      name: Set(new.name),
      description: Set(new.description),
      price: Set(new.price),
      start_date: Set(new.start_date),
      end_date: Set(new.end_date),
      location: Set(new.location),
      category: Set(new.category),
      available_seats: Set(new.available_seats),
      capacity: Set(new.available_seats),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    info!(
      "Event {} `{}` created with {} seats",
      event.id, event.name, event.available_seats
    );
    Ok(event)
  }

  pub async fn all(&self) -> Result<Vec<event::Model>> {
    Ok(
      event::Entity::find()
        .order_by_asc(event::Column::StartDate)
        .order_by_asc(event::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_id(&self, id: i32) -> Result<event::Model> {
    event::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("Event"))
  }
}
