use std::collections::HashMap;

use json::Value;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{AccountRole, account, booking, event},
  prelude::*,
  utils::positive_int,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookingReq {
  pub user_id: Option<Value>,
  pub evt_item_id: Option<Value>,
  pub quantity: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewBooking {
  pub account_id: i32,
  pub event_id: i32,
  pub quantity: i32,
}

impl NewBookingReq {
  pub fn validate(self) -> Result<NewBooking> {
    Ok(NewBooking {
      account_id: positive_int(self.user_id.as_ref(), "userId")?,
      event_id: positive_int(self.evt_item_id.as_ref(), "evtItemId")?,
      quantity: positive_int(self.quantity.as_ref(), "quantity")?,
    })
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookingReq {
  pub quantity: Option<Value>,
}

impl UpdateBookingReq {
  pub fn validate(self) -> Result<i32> {
    positive_int(self.quantity.as_ref(), "quantity")
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
  pub id: i32,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub role: AccountRole,
}

impl From<account::Model> for AccountSummary {
  fn from(account: account::Model) -> Self {
    Self {
      id: account.id,
      email: account.email,
      first_name: account.first_name,
      last_name: account.last_name,
      role: account.role,
    }
  }
}

/// A booking joined with its account and event.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetail {
  #[serde(flatten)]
  pub booking: booking::Model,
  pub user: Option<AccountSummary>,
  pub event: Option<event::Model>,
}

pub struct Bookings<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Bookings<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Books seats for `actor`, who must be the account named in the request.
  /// The seat decrement and the booking row commit together.
  pub async fn create(&self, actor: i32, new: NewBooking) -> Result<booking::Model> {
    if actor != new.account_id {
      return Err(Error::Forbidden);
    }

    let txn = self.db.begin().await?;

    account::Entity::find_by_id(new.account_id)
      .one(&txn)
      .await?
      .ok_or(Error::NotFound("Account"))?;

    let event = event::Entity::find_by_id(new.event_id)
      .one(&txn)
      .await?
      .ok_or(Error::NotFound("Event"))?;

    if new.quantity > event.available_seats {
      return Err(Error::InsufficientInventory);
    }

    Self::adjust_seats(&txn, event.id, new.quantity).await?;

    let now = Utc::now().naive_utc();
    let booking = booking::ActiveModel {
      id: NotSet,
      account_id: Set(new.account_id),
      event_id: Set(event.id),
      quantity: Set(new.quantity),
      total_cost: Set(total_cost(event.price, new.quantity)),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
      "Booking {}: account {} took {} seats of event {}",
      booking.id, booking.account_id, booking.quantity, booking.event_id
    );
    Ok(booking)
  }

  /// Changes the booked quantity. The booking already holds its old seats,
  /// so growth is limited by what the event still has available.
  pub async fn update(&self, id: i32, quantity: i32) -> Result<booking::Model> {
    let txn = self.db.begin().await?;

    let booking = booking::Entity::find_by_id(id)
      .lock_exclusive()
      .one(&txn)
      .await?
      .ok_or(Error::NotFound("Transaction"))?;

    let event = event::Entity::find_by_id(booking.event_id)
      .one(&txn)
      .await?
      .ok_or(Error::NotFound("Event"))?;

    let delta = quantity - booking.quantity;
    if delta > event.available_seats {
      return Err(Error::InsufficientInventory);
    }

    let booking = Self::rewrite(&txn, &booking, event.price, quantity).await?;
    if delta != 0 {
      Self::adjust_seats(&txn, event.id, delta).await?;
    }

    txn.commit().await?;

    info!(
      "Booking {} now holds {} seats of event {} (delta {})",
      booking.id, booking.quantity, booking.event_id, delta
    );
    Ok(booking)
  }

  /// Deletes the booking and returns its seats to the event.
  pub async fn delete(&self, id: i32) -> Result<()> {
    let txn = self.db.begin().await?;

    let booking = booking::Entity::find_by_id(id)
      .lock_exclusive()
      .one(&txn)
      .await?
      .ok_or(Error::NotFound("Transaction"))?;

    Self::remove(&txn, &booking).await?;

    txn.commit().await?;

    info!(
      "Booking {} deleted, {} seats returned to event {}",
      booking.id, booking.quantity, booking.event_id
    );
    Ok(())
  }

  pub async fn all(&self) -> Result<Vec<BookingDetail>> {
    let rows = booking::Entity::find()
      .find_also_related(event::Entity)
      .order_by_asc(booking::Column::Id)
      .all(self.db)
      .await?;

    self.with_accounts(rows).await
  }

  pub async fn by_id(&self, id: i32) -> Result<BookingDetail> {
    let row = booking::Entity::find_by_id(id)
      .find_also_related(event::Entity)
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("Transaction"))?;

    let mut details = self.with_accounts(vec![row]).await?;
    details.pop().ok_or(Error::NotFound("Transaction"))
  }

  async fn with_accounts(
    &self,
    rows: Vec<(booking::Model, Option<event::Model>)>,
  ) -> Result<Vec<BookingDetail>> {
    let ids: Vec<i32> = rows.iter().map(|(booking, _)| booking.account_id).collect();

    let accounts: HashMap<i32, AccountSummary> = account::Entity::find()
      .filter(account::Column::Id.is_in(ids))
      .all(self.db)
      .await?
      .into_iter()
      .map(|account| (account.id, account.into()))
      .collect();

    Ok(
      rows
        .into_iter()
        .map(|(booking, event)| BookingDetail {
          user: accounts.get(&booking.account_id).cloned(),
          booking,
          event,
        })
        .collect(),
    )
  }

  /// Writes the new quantity only while the row still holds the quantity
  /// `booking` was read with.
  async fn rewrite<C: ConnectionTrait>(
    conn: &C,
    booking: &booking::Model,
    price: i32,
    quantity: i32,
  ) -> Result<booking::Model> {
    let total_cost = total_cost(price, quantity);
    let updated_at = Utc::now().naive_utc();

    let result = booking::Entity::update_many()
      .col_expr(booking::Column::Quantity, Expr::value(quantity))
      .col_expr(booking::Column::TotalCost, Expr::value(total_cost))
      .col_expr(booking::Column::UpdatedAt, Expr::value(updated_at))
      .filter(booking::Column::Id.eq(booking.id))
      .filter(booking::Column::Quantity.eq(booking.quantity))
      .exec(conn)
      .await?;

    if result.rows_affected == 0 {
      return Err(Error::Conflict("Transaction"));
    }

    Ok(booking::Model { quantity, total_cost, updated_at, ..booking.clone() })
  }

  /// Seats come back only if this call actually removed the row.
  async fn remove<C: ConnectionTrait>(conn: &C, booking: &booking::Model) -> Result<()> {
    let result = booking::Entity::delete_by_id(booking.id).exec(conn).await?;
    if result.rows_affected == 0 {
      return Err(Error::NotFound("Transaction"));
    }

    Self::adjust_seats(conn, booking.event_id, -booking.quantity).await
  }

  /// Takes `delta` seats from the event (or returns them when negative).
  /// Taking is a conditional update, so concurrent bookings can never push
  /// `available_seats` below zero.
  async fn adjust_seats<C: ConnectionTrait>(
    conn: &C,
    event_id: i32,
    delta: i32,
  ) -> Result<()> {
    let seats = event::Column::AvailableSeats;

    let mut update = event::Entity::update_many()
      .filter(event::Column::Id.eq(event_id));
    update = if delta >= 0 {
      update
        .col_expr(seats, Expr::col(seats).sub(delta))
        .filter(seats.gte(delta))
    } else {
      update.col_expr(seats, Expr::col(seats).add(-delta))
    };

    let result = update.exec(conn).await?;
    if result.rows_affected == 0 {
      return Err(if delta > 0 {
        Error::InsufficientInventory
      } else {
        Error::NotFound("Event")
      });
    }

    Ok(())
  }
}

fn total_cost(price: i32, quantity: i32) -> i64 {
  i64::from(price) * i64::from(quantity)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  async fn reload(db: &DatabaseConnection, id: i32) -> event::Model {
    event::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
  }

  /// `available_seats` plus every live booking adds up to the capacity.
  async fn assert_ledger(db: &DatabaseConnection, event_id: i32) {
    let event = reload(db, event_id).await;
    let held: i32 = booking::Entity::find()
      .filter(booking::Column::EventId.eq(event_id))
      .all(db)
      .await
      .unwrap()
      .iter()
      .map(|b| b.quantity)
      .sum();

    assert!(event.available_seats >= 0);
    assert_eq!(event.available_seats + held, event.capacity);
  }

  fn new(account_id: i32, event_id: i32, quantity: i32) -> NewBooking {
    NewBooking { account_id, event_id, quantity }
  }

  #[test]
  fn test_validate_request() {
    let req = NewBookingReq {
      user_id: Some(json::json!(1)),
      evt_item_id: Some(json::json!("2")),
      quantity: Some(json::json!(3)),
    };
    assert_eq!(req.validate().unwrap(), new(1, 2, 3));

    let req = NewBookingReq {
      user_id: Some(json::json!(1)),
      evt_item_id: Some(json::json!(2)),
      quantity: Some(json::json!(0)),
    };
    assert!(matches!(req.validate(), Err(Error::Validation(_))));

    let req = NewBookingReq { user_id: None, ..Default::default() };
    assert!(matches!(req.validate(), Err(Error::Validation(_))));
  }

  #[tokio::test]
  async fn test_create_takes_seats() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 25, 10).await;

    let booking = Bookings::new(&db).create(acc.id, new(acc.id, evt.id, 4)).await.unwrap();

    assert_eq!(booking.quantity, 4);
    assert_eq!(booking.total_cost, 100);
    assert_eq!(reload(&db, evt.id).await.available_seats, 6);
    assert_ledger(&db, evt.id).await;
  }

  #[tokio::test]
  async fn test_create_forbidden_for_other_account() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;
    let other = test_db::account(&db, "o@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 25, 10).await;

    let result = Bookings::new(&db).create(other.id, new(acc.id, evt.id, 1)).await;

    assert!(matches!(result, Err(Error::Forbidden)));
    assert_eq!(reload(&db, evt.id).await.available_seats, 10);
    assert_eq!(booking::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_create_insufficient_inventory() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 25, 3).await;

    let result = Bookings::new(&db).create(acc.id, new(acc.id, evt.id, 4)).await;

    assert!(matches!(result, Err(Error::InsufficientInventory)));
    assert_eq!(reload(&db, evt.id).await.available_seats, 3);
    assert_eq!(booking::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_create_unknown_event() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;

    let result = Bookings::new(&db).create(acc.id, new(acc.id, 77, 1)).await;
    assert!(matches!(result, Err(Error::NotFound("Event"))));
  }

  // The in-memory pool has one connection, so these transactions run in
  // turn. The `_on_postgres` tests below cover real interleaving.
  #[tokio::test]
  async fn test_concurrent_bookings_cannot_oversell() {
    let db = test_db::setup().await;
    let a = test_db::account(&db, "a@example.com", AccountRole::Customer).await;
    let b = test_db::account(&db, "b@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 10, 3).await;

    let bookings = Bookings::new(&db);
    let (first, second) = tokio::join!(
      bookings.create(a.id, new(a.id, evt.id, 2)),
      bookings.create(b.id, new(b.id, evt.id, 2)),
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let failed = if first.is_err() { first } else { second };
    assert!(matches!(failed, Err(Error::InsufficientInventory)));

    assert_eq!(reload(&db, evt.id).await.available_seats, 1);
    assert_ledger(&db, evt.id).await;
  }

  #[tokio::test]
  async fn test_conditional_decrement_guards_stale_reads() {
    let db = test_db::setup().await;
    let evt = test_db::event(&db, 10, 2).await;

    // A caller that read 2 free seats and asks for 3 must not go negative.
    let result = Bookings::adjust_seats(&db, evt.id, 3).await;

    assert!(matches!(result, Err(Error::InsufficientInventory)));
    assert_eq!(reload(&db, evt.id).await.available_seats, 2);
  }

  #[tokio::test]
  async fn test_update_grows_and_shrinks() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 5, 10).await;
    let bookings = Bookings::new(&db);

    let booking = bookings.create(acc.id, new(acc.id, evt.id, 2)).await.unwrap();

    let grown = bookings.update(booking.id, 7).await.unwrap();
    assert_eq!(grown.quantity, 7);
    assert_eq!(grown.total_cost, 35);
    assert_eq!(reload(&db, evt.id).await.available_seats, 3);
    assert_ledger(&db, evt.id).await;

    let shrunk = bookings.update(booking.id, 1).await.unwrap();
    assert_eq!(shrunk.total_cost, 5);
    assert_eq!(reload(&db, evt.id).await.available_seats, 9);
    assert_ledger(&db, evt.id).await;
  }

  #[tokio::test]
  async fn test_update_may_use_every_remaining_seat() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 5, 10).await;
    let bookings = Bookings::new(&db);

    let booking = bookings.create(acc.id, new(acc.id, evt.id, 4)).await.unwrap();

    // 6 free seats plus the 4 already held.
    bookings.update(booking.id, 10).await.unwrap();
    assert_eq!(reload(&db, evt.id).await.available_seats, 0);

    let result = bookings.update(booking.id, 11).await;
    assert!(matches!(result, Err(Error::InsufficientInventory)));
    assert_eq!(reload(&db, evt.id).await.available_seats, 0);
    assert_ledger(&db, evt.id).await;
  }

  #[tokio::test]
  async fn test_update_recomputes_cost_at_current_price() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 5, 10).await;
    let bookings = Bookings::new(&db);

    let booking = bookings.create(acc.id, new(acc.id, evt.id, 2)).await.unwrap();
    event::ActiveModel { price: Set(8), ..evt.clone().into() }
      .update(&db)
      .await
      .unwrap();

    let stored = booking::Entity::find_by_id(booking.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.total_cost, 10);

    let updated = bookings.update(booking.id, 3).await.unwrap();
    assert_eq!(updated.total_cost, 24);
  }

  #[tokio::test]
  async fn test_update_unknown() {
    let db = test_db::setup().await;
    let result = Bookings::new(&db).update(5, 1).await;
    assert!(matches!(result, Err(Error::NotFound("Transaction"))));
  }

  #[tokio::test]
  async fn test_delete_returns_seats() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 5, 10).await;
    let bookings = Bookings::new(&db);

    let booking = bookings.create(acc.id, new(acc.id, evt.id, 6)).await.unwrap();
    let before = reload(&db, evt.id).await.available_seats;

    bookings.delete(booking.id).await.unwrap();

    assert_eq!(reload(&db, evt.id).await.available_seats, before + 6);
    assert!(matches!(
      bookings.by_id(booking.id).await,
      Err(Error::NotFound("Transaction"))
    ));
    assert!(matches!(
      bookings.delete(booking.id).await,
      Err(Error::NotFound("Transaction"))
    ));
    assert_ledger(&db, evt.id).await;
  }

  #[tokio::test]
  async fn test_list_and_get_join_account_and_event() {
    let db = test_db::setup().await;
    let a = test_db::account(&db, "a@example.com", AccountRole::Customer).await;
    let b = test_db::account(&db, "b@example.com", AccountRole::Organizer).await;
    let evt = test_db::event(&db, 5, 10).await;
    let bookings = Bookings::new(&db);

    let first = bookings.create(a.id, new(a.id, evt.id, 1)).await.unwrap();
    bookings.create(b.id, new(b.id, evt.id, 2)).await.unwrap();
    bookings.create(a.id, new(a.id, evt.id, 3)).await.unwrap();

    let all = bookings.all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].user.as_ref().unwrap().email, "b@example.com");
    assert_eq!(all[2].user.as_ref().unwrap().id, a.id);
    assert!(all.iter().all(|d| d.event.as_ref().unwrap().id == evt.id));

    let detail = bookings.by_id(first.id).await.unwrap();
    assert_eq!(detail.booking.quantity, 1);
    assert_eq!(detail.user.unwrap().email, "a@example.com");
    assert_eq!(detail.event.unwrap().name, "Rust Meetup");
  }

  #[tokio::test]
  async fn test_stale_delete_returns_no_seats() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 5, 10).await;
    let bookings = Bookings::new(&db);

    let booking = bookings.create(acc.id, new(acc.id, evt.id, 3)).await.unwrap();
    bookings.delete(booking.id).await.unwrap();

    // A second request that read the row before it was deleted.
    let result = Bookings::remove(&db, &booking).await;

    assert!(matches!(result, Err(Error::NotFound("Transaction"))));
    assert_eq!(reload(&db, evt.id).await.available_seats, 10);
    assert_ledger(&db, evt.id).await;
  }

  #[tokio::test]
  async fn test_stale_rewrite_conflicts() {
    let db = test_db::setup().await;
    let acc = test_db::account(&db, "c@example.com", AccountRole::Customer).await;
    let evt = test_db::event(&db, 5, 10).await;
    let bookings = Bookings::new(&db);

    let stale = bookings.create(acc.id, new(acc.id, evt.id, 2)).await.unwrap();
    bookings.update(stale.id, 5).await.unwrap();

    let result = Bookings::rewrite(&db, &stale, evt.price, 4).await;

    assert!(matches!(result, Err(Error::Conflict("Transaction"))));
    let stored = booking::Entity::find_by_id(stale.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.quantity, 5);
    assert_eq!(stored.total_cost, 25);
    assert_ledger(&db, evt.id).await;
  }

  const ROUNDS: usize = 20;

  #[tokio::test]
  async fn test_concurrent_creates_on_postgres() {
    let Some(db) = test_db::postgres().await else { return };
    let bookings = Bookings::new(&db);

    for _ in 0..ROUNDS {
      let a = test_db::account(&db, &test_db::unique_email(), AccountRole::Customer).await;
      let b = test_db::account(&db, &test_db::unique_email(), AccountRole::Customer).await;
      let evt = test_db::event(&db, 10, 3).await;

      let (first, second) = tokio::join!(
        bookings.create(a.id, new(a.id, evt.id, 2)),
        bookings.create(b.id, new(b.id, evt.id, 2)),
      );

      assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
      assert_eq!(reload(&db, evt.id).await.available_seats, 1);
      assert_ledger(&db, evt.id).await;
    }
  }

  #[tokio::test]
  async fn test_concurrent_updates_on_postgres() {
    let Some(db) = test_db::postgres().await else { return };
    let bookings = Bookings::new(&db);

    for _ in 0..ROUNDS {
      let acc = test_db::account(&db, &test_db::unique_email(), AccountRole::Customer).await;
      let evt = test_db::event(&db, 10, 10).await;
      let booking = bookings.create(acc.id, new(acc.id, evt.id, 2)).await.unwrap();

      let (first, second) = tokio::join!(
        bookings.update(booking.id, 5),
        bookings.update(booking.id, 4),
      );
      first.unwrap();
      second.unwrap();

      assert_ledger(&db, evt.id).await;
    }
  }

  #[tokio::test]
  async fn test_concurrent_deletes_on_postgres() {
    let Some(db) = test_db::postgres().await else { return };
    let bookings = Bookings::new(&db);

    for _ in 0..ROUNDS {
      let acc = test_db::account(&db, &test_db::unique_email(), AccountRole::Customer).await;
      let evt = test_db::event(&db, 10, 10).await;
      let booking = bookings.create(acc.id, new(acc.id, evt.id, 3)).await.unwrap();

      let (first, second) =
        tokio::join!(bookings.delete(booking.id), bookings.delete(booking.id));

      assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
      let failed = if first.is_err() { first } else { second };
      assert!(matches!(failed, Err(Error::NotFound("Transaction"))));

      assert_eq!(reload(&db, evt.id).await.available_seats, 10);
      assert_ledger(&db, evt.id).await;
    }
  }
}
