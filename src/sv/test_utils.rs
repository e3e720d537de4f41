//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use migration::{Migrator, MigratorTrait};
  use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema,
  };
  use tokio::sync::OnceCell;
  use uuid::Uuid;

  use crate::{entity::*, prelude::*, utils::parse_date};

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(account::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(point_ledger::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(coupon::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(event::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(booking::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  /// Connects to the Postgres database in `TEST_DATABASE_URL` and migrates
  /// it once per test run. Returns `None` when the variable is unset.
  ///
  /// Unlike the in-memory SQLite setup, the pool hands out several
  /// connections, so concurrent transactions really interleave.
  pub async fn postgres() -> Option<DatabaseConnection> {
    static MIGRATED: OnceCell<()> = OnceCell::const_new();

    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let db = Database::connect(&url).await.unwrap();
    MIGRATED
      .get_or_init(|| async { Migrator::up(&db, None).await.unwrap() })
      .await;

    Some(db)
  }

  /// Email that stays unique across runs against a persistent database.
  pub fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4().simple())
  }

  pub async fn account(
    db: &DatabaseConnection,
    email: &str,
    role: AccountRole,
  ) -> account::Model {
    let now = Utc::now().naive_utc();
    account::ActiveModel {
      id: NotSet,
      email: Set(email.into()),
      password: Set("not-a-hash".into()),
      first_name: Set("Test".into()),
      last_name: Set("User".into()),
      is_verified: Set(true),
      role: Set(role),
      referral_code: Set(format!("REF-{email}")),
      referred_by: Set(None),
      points: Set(0),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn event(
    db: &DatabaseConnection,
    price: i32,
    seats: i32,
  ) -> event::Model {
    event::ActiveModel {
      id: NotSet,
      name: Set("Rust Meetup".into()),
      description: Set("Monthly meetup".into()),
      price: Set(price),
      start_date: Set(parse_date("2030-05-01T18:00:00Z").unwrap()),
      end_date: Set(parse_date("2030-05-01T21:00:00Z").unwrap()),
      location: Set("Berlin".into()),
      category: Set("Tech".into()),
      available_seats: Set(seats),
      capacity: Set(seats),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }
}
