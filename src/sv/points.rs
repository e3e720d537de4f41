use crate::{
  entity::{PointReason, account, point_ledger},
  prelude::*,
};

pub struct Points<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Points<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Sum of the account's ledger entries that have not expired yet.
  pub async fn available(&self, account_id: i32) -> Result<i64> {
    Self::available_in(self.db, account_id).await
  }

  pub async fn available_in<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
  ) -> Result<i64> {
    let now = Utc::now().naive_utc();

    let total: Option<Option<i64>> = point_ledger::Entity::find()
      .select_only()
      .column_as(point_ledger::Column::Points.sum(), "total")
      .filter(point_ledger::Column::AccountId.eq(account_id))
      .filter(point_ledger::Column::ExpiresAt.gt(now))
      .into_tuple()
      .one(conn)
      .await?;

    Ok(total.flatten().unwrap_or(0))
  }

  /// Credits `points` to the account and appends the matching ledger entry.
  /// Runs on the caller's connection so it can join an open transaction.
  pub async fn grant<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    points: i32,
    reason: PointReason,
    expires_at: DateTime,
  ) -> Result<point_ledger::Model> {
    let now = Utc::now().naive_utc();

    let updated = account::Entity::update_many()
      .col_expr(
        account::Column::Points,
        Expr::col(account::Column::Points).add(points),
      )
      .col_expr(account::Column::UpdatedAt, Expr::value(now))
      .filter(account::Column::Id.eq(account_id))
      .exec(conn)
      .await?;

    if updated.rows_affected == 0 {
      return Err(Error::NotFound("Account"));
    }

    let entry = point_ledger::ActiveModel {
      id: NotSet,
      account_id: Set(account_id),
      points: Set(points),
      reason: Set(reason),
      created_at: Set(now),
      expires_at: Set(expires_at),
    }
    .insert(conn)
    .await?;

    Ok(entry)
  }
}
