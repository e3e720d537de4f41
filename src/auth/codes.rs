use rand::{Rng, distributions::Alphanumeric};
use uuid::Uuid;

pub const REFERRAL_CODE_LEN: usize = 8;
pub const COUPON_PREFIX: &str = "DISC-";

/// Source of the random codes handed out to accounts.
pub trait CodeGenerator: Send + Sync {
  fn referral_code(&self) -> String;

  /// Random part of a coupon code, without [`COUPON_PREFIX`].
  fn coupon_suffix(&self) -> String;

  fn coupon_code(&self) -> String {
    format!("{COUPON_PREFIX}{}", self.coupon_suffix())
  }
}

pub struct RandomCodes;

impl CodeGenerator for RandomCodes {
  fn referral_code(&self) -> String {
    rand::thread_rng()
      .sample_iter(&Alphanumeric)
      .take(REFERRAL_CODE_LEN)
      .map(|c| (c as char).to_ascii_uppercase())
      .collect()
  }

  fn coupon_suffix(&self) -> String {
    Uuid::new_v4().simple().to_string()[..10].to_ascii_uppercase()
  }
}
