use sea_orm_migration::prelude::*;

use super::{
  m20250301_000001_create_accounts::Accounts,
  m20250302_000004_create_events::Events,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Bookings::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Bookings::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Bookings::AccountId).integer().not_null())
          .col(ColumnDef::new(Bookings::EventId).integer().not_null())
          .col(ColumnDef::new(Bookings::Quantity).integer().not_null())
          .col(ColumnDef::new(Bookings::TotalCost).big_integer().not_null())
          .col(ColumnDef::new(Bookings::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Bookings::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_bookings_account")
              .from(Bookings::Table, Bookings::AccountId)
              .to(Accounts::Table, Accounts::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_bookings_event")
              .from(Bookings::Table, Bookings::EventId)
              .to(Events::Table, Events::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_bookings_event")
          .table(Bookings::Table)
          .col(Bookings::EventId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Bookings::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
enum Bookings {
  Table,
  Id,
  AccountId,
  EventId,
  Quantity,
  TotalCost,
  CreatedAt,
  UpdatedAt,
}
