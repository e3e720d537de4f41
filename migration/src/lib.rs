pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_accounts;
mod m20250301_000002_create_point_ledger;
mod m20250301_000003_create_coupons;
mod m20250302_000004_create_events;
mod m20250302_000005_create_bookings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20250301_000001_create_accounts::Migration),
      Box::new(m20250301_000002_create_point_ledger::Migration),
      Box::new(m20250301_000003_create_coupons::Migration),
      Box::new(m20250302_000004_create_events::Migration),
      Box::new(m20250302_000005_create_bookings::Migration),
    ]
  }
}
