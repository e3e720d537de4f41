use jsonwebtoken::{
  DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{AccountRole, account},
  prelude::*,
};

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub id: i32,
  pub email: String,
  pub role: AccountRole,
  pub iat: i64,
  pub exp: i64,
}

/// Signs and verifies stateless HS256 session tokens.
pub struct TokenIssuer {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl: TimeDelta,
}

impl TokenIssuer {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::days(1)),
    }
  }

  pub fn issue(&self, account: &account::Model) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
      id: account.id,
      email: account.email.clone(),
      role: account.role,
      iat: now.timestamp(),
      exp: (now + self.ttl).timestamp(),
    };
    self.encode(&claims)
  }

  pub fn encode(&self, claims: &Claims) -> Result<String> {
    encode(&Header::default(), claims, &self.encoding)
      .map_err(|err| Error::Internal(format!("token signing failed: {err}")))
  }

  /// Fails with [`Error::InvalidToken`] on a bad signature, malformed token
  /// or past expiry.
  pub fn verify(&self, token: &str) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &self.decoding, &validation)
      .map(|data| data.claims)
      .map_err(|err| {
        debug!("token rejected: {err}");
        Error::InvalidToken
      })
  }
}
