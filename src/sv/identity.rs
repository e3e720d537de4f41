use sea_orm::{DatabaseTransaction, DbErr, SqlErr};
use serde::{Deserialize, Serialize};

use crate::{
  auth::{CodeGenerator, TokenIssuer, password},
  entity::{AccountRole, PointReason, account, coupon},
  prelude::*,
  sv::{Coupons, Points},
  utils::{add_months, required_str},
};

pub const REFERRAL_BONUS_POINTS: i32 = 10_000;
pub const REFERRAL_POINTS_TTL_MONTHS: u32 = 3;
pub const COUPON_DISCOUNT_PERCENT: i32 = 10;
pub const COUPON_TTL_MONTHS: u32 = 1;

const CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpReq {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>,
  pub role: Option<String>,
  pub referred_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignUp {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub password: String,
  pub role: AccountRole,
  pub referred_by: Option<String>,
}

impl SignUpReq {
  pub fn validate(self) -> Result<SignUp> {
    let role = required_str(self.role, "role")?;
    let role = role.parse().map_err(|_| {
      Error::validation("role must be either CUSTOMER or ORGANIZER")
    })?;

    Ok(SignUp {
      first_name: required_str(self.first_name, "firstName")?,
      last_name: required_str(self.last_name, "lastName")?,
      email: required_str(self.email, "email")?.to_lowercase(),
      password: self
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::validation("password is required"))?,
      role,
      referred_by: self
        .referred_by
        .map(|code| code.trim().to_owned())
        .filter(|code| !code.is_empty()),
    })
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct SignInReq {
  pub email: Option<String>,
  pub password: Option<String>,
}

/// Public view of an account, with points computed from the live ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
  pub id: i32,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub role: AccountRole,
  pub is_verified: bool,
  pub referral_code: String,
  pub referred_by: Option<String>,
  pub points: i64,
}

impl AccountView {
  pub fn new(account: &account::Model, points: i64) -> Self {
    Self {
      id: account.id,
      email: account.email.clone(),
      first_name: account.first_name.clone(),
      last_name: account.last_name.clone(),
      role: account.role,
      is_verified: account.is_verified,
      referral_code: account.referral_code.clone(),
      referred_by: account.referred_by.clone(),
      points,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct SignUpOutcome {
  pub user: AccountView,
  pub coupon: Option<coupon::Model>,
}

#[derive(Debug, Serialize)]
pub struct Session {
  pub token: String,
  pub user: AccountView,
}

pub struct Identity<'a> {
  db: &'a DatabaseConnection,
  tokens: &'a TokenIssuer,
  codes: &'a dyn CodeGenerator,
}

impl<'a> Identity<'a> {
  pub fn new(
    db: &'a DatabaseConnection,
    tokens: &'a TokenIssuer,
    codes: &'a dyn CodeGenerator,
  ) -> Self {
    Self { db, tokens, codes }
  }

  /// Creates the account and pays out the referral, if any, in one
  /// transaction. Nothing is written when any step fails.
  pub async fn sign_up(&self, req: SignUp) -> Result<SignUpOutcome> {
    let password_hash = password::hash(&req.password)?;

    let txn = self.db.begin().await?;

    let taken = account::Entity::find()
      .filter(account::Column::Email.eq(&req.email))
      .count(&txn)
      .await?
      > 0;
    if taken {
      return Err(Error::DuplicateEmail);
    }

    let referrer = match &req.referred_by {
      Some(code) => Some(
        account::Entity::find()
          .filter(account::Column::ReferralCode.eq(code))
          .one(&txn)
          .await?
          .ok_or(Error::InvalidReferral)?,
      ),
      None => None,
    };

    let referral_code = self.unique_referral_code(&txn).await?;
    let now = Utc::now().naive_utc();

    let account = account::ActiveModel {
      id: NotSet,
      email: Set(req.email),
      password: Set(password_hash),
      first_name: Set(req.first_name),
      last_name: Set(req.last_name),
      is_verified: Set(true),
      role: Set(req.role),
      referral_code: Set(referral_code),
      referred_by: Set(req.referred_by),
      points: Set(0),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(insert_error)?;

    let mut coupon = None;
    if let Some(referrer) = referrer {
      Points::grant(
        &txn,
        referrer.id,
        REFERRAL_BONUS_POINTS,
        PointReason::Referral,
        add_months(now, REFERRAL_POINTS_TTL_MONTHS)?,
      )
      .await?;

      coupon = Some(
        Coupons::issue(
          &txn,
          self.codes,
          account.id,
          COUPON_DISCOUNT_PERCENT,
          add_months(now, COUPON_TTL_MONTHS)?,
        )
        .await?,
      );

      info!(
        "Referral payout: {} points to account {} for signup of {}",
        REFERRAL_BONUS_POINTS, referrer.id, account.id
      );
    }

    txn.commit().await?;

    info!("Account {} signed up as {:?}", account.id, account.role);
    Ok(SignUpOutcome { user: AccountView::new(&account, 0), coupon })
  }

  /// Unknown email and wrong password fail identically.
  pub async fn sign_in(&self, req: SignInReq) -> Result<Session> {
    let email = required_str(req.email, "email")?.to_lowercase();
    let password = req
      .password
      .filter(|p| !p.is_empty())
      .ok_or_else(|| Error::validation("password is required"))?;

    let account = account::Entity::find()
      .filter(account::Column::Email.eq(email))
      .one(self.db)
      .await?
      .ok_or(Error::InvalidCredentials)?;

    if !password::verify(&password, &account.password) {
      return Err(Error::InvalidCredentials);
    }

    self.session(account).await
  }

  pub async fn keep_sign_in(&self, token: &str) -> Result<Session> {
    let claims = self.tokens.verify(token)?;

    let account = account::Entity::find_by_id(claims.id)
      .filter(account::Column::IsVerified.eq(true))
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("Account"))?;

    self.session(account).await
  }

  async fn session(&self, account: account::Model) -> Result<Session> {
    let points = Points::new(self.db).available(account.id).await?;
    let token = self.tokens.issue(&account)?;
    Ok(Session { token, user: AccountView::new(&account, points) })
  }

  async fn unique_referral_code(&self, txn: &DatabaseTransaction) -> Result<String> {
    for _ in 0..CODE_ATTEMPTS {
      let code = self.codes.referral_code();
      let taken = account::Entity::find()
        .filter(account::Column::ReferralCode.eq(&code))
        .count(txn)
        .await?
        > 0;
      if !taken {
        return Ok(code);
      }
    }
    Err(Error::Internal("could not generate a unique referral code".into()))
  }
}

/// Only a clash on `email` is the caller's fault. A clash on the referral
/// code means a concurrent signup won the generated code.
fn insert_error(err: DbErr) -> Error {
  match err.sql_err() {
    Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
      Error::DuplicateEmail
    }
    Some(SqlErr::UniqueConstraintViolation(detail)) => {
      Error::Internal(format!("account insert collided: {detail}"))
    }
    _ => Error::Db(err),
  }
}
