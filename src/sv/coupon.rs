use crate::{auth::CodeGenerator, entity::coupon, prelude::*};

const CODE_ATTEMPTS: usize = 5;

pub struct Coupons<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Coupons<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_account(&self, account_id: i32) -> Result<Vec<coupon::Model>> {
    Ok(
      coupon::Entity::find()
        .filter(coupon::Column::AccountId.eq(account_id))
        .order_by_desc(coupon::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  /// Issues a coupon with a code not used by any other coupon.
  pub async fn issue<C: ConnectionTrait>(
    conn: &C,
    codes: &dyn CodeGenerator,
    account_id: i32,
    discount_percent: i32,
    expires_at: DateTime,
  ) -> Result<coupon::Model> {
    for _ in 0..CODE_ATTEMPTS {
      let code = codes.coupon_code();

      let taken = coupon::Entity::find()
        .filter(coupon::Column::Code.eq(&code))
        .count(conn)
        .await?
        > 0;
      if taken {
        debug!("coupon code {code} already taken, retrying");
        continue;
      }

      let coupon = coupon::ActiveModel {
        id: NotSet,
        account_id: Set(account_id),
        code: Set(code),
        discount_percent: Set(discount_percent),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now().naive_utc()),
      }
      .insert(conn)
      .await?;

      return Ok(coupon);
    }

    Err(Error::Internal("could not generate a unique coupon code".into()))
  }
}
