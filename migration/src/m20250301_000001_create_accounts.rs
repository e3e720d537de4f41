use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Accounts::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Accounts::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Accounts::Email).string().not_null().unique_key())
          .col(ColumnDef::new(Accounts::Password).string().not_null())
          .col(ColumnDef::new(Accounts::FirstName).string().not_null())
          .col(ColumnDef::new(Accounts::LastName).string().not_null())
          .col(
            ColumnDef::new(Accounts::IsVerified)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(
            ColumnDef::new(Accounts::Role)
              .string()
              .not_null()
              .default("CUSTOMER"),
          )
          .col(
            ColumnDef::new(Accounts::ReferralCode)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Accounts::ReferredBy).string().null())
          .col(
            ColumnDef::new(Accounts::Points).integer().not_null().default(0),
          )
          .col(ColumnDef::new(Accounts::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Accounts::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Accounts::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Accounts {
  Table,
  Id,
  Email,
  Password,
  FirstName,
  LastName,
  IsVerified,
  Role,
  ReferralCode,
  ReferredBy,
  Points,
  CreatedAt,
  UpdatedAt,
}
