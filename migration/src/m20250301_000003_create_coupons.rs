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
          .table(Coupons::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Coupons::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Coupons::AccountId).integer().not_null())
          .col(ColumnDef::new(Coupons::Code).string().not_null().unique_key())
          .col(ColumnDef::new(Coupons::DiscountPercent).integer().not_null())
          .col(ColumnDef::new(Coupons::ExpiresAt).date_time().not_null())
          .col(ColumnDef::new(Coupons::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_coupons_account")
              .from(Coupons::Table, Coupons::AccountId)
              .to(Accounts::Table, Accounts::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_coupons_account")
          .table(Coupons::Table)
          .col(Coupons::AccountId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Coupons::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Coupons {
  Table,
  Id,
  AccountId,
  Code,
  DiscountPercent,
  ExpiresAt,
  CreatedAt,
}
