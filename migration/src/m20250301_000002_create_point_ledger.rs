use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_accounts::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PointLedger::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PointLedger::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(PointLedger::AccountId).integer().not_null())
          .col(ColumnDef::new(PointLedger::Points).integer().not_null())
          .col(ColumnDef::new(PointLedger::Reason).string().not_null())
          .col(ColumnDef::new(PointLedger::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(PointLedger::ExpiresAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_point_ledger_account")
              .from(PointLedger::Table, PointLedger::AccountId)
              .to(Accounts::Table, Accounts::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // Available balance is summed per account over unexpired rows.
    manager
      .create_index(
        Index::create()
          .name("idx_point_ledger_account_expiry")
          .table(PointLedger::Table)
          .col(PointLedger::AccountId)
          .col(PointLedger::ExpiresAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PointLedger::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PointLedger {
  Table,
  Id,
  AccountId,
  Points,
  Reason,
  CreatedAt,
  ExpiresAt,
}
