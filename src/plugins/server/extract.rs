use std::sync::Arc;

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Request},
  http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use serde::de::DeserializeOwned;

use crate::{
  auth::{Capability, Claims},
  prelude::*,
  state::AppState,
};

fn bearer(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|token| !token.is_empty())
}

/// Raw bearer token; a missing header is reported as an invalid token.
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
  type Rejection = Error;

  async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self> {
    bearer(&parts.headers)
      .map(|token| Self(token.to_owned()))
      .ok_or(Error::InvalidToken)
  }
}

/// Verified session claims of the caller.
pub struct Session(pub Claims);

impl Session {
  pub fn require(&self, capability: Capability) -> Result<&Claims> {
    if self.0.role.allows(capability) {
      Ok(&self.0)
    } else {
      Err(Error::Forbidden)
    }
  }
}

impl FromRequestParts<Arc<AppState>> for Session {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    let token = bearer(&parts.headers).ok_or(Error::Unauthorized)?;
    let claims = app.tokens.verify(token).map_err(|_| Error::Unauthorized)?;
    Ok(Self(claims))
  }
}

/// JSON body whose rejections surface as validation errors.
pub struct Body<T>(pub T);

impl<S, T> FromRequest<S> for Body<T>
where
  S: Send + Sync,
  T: DeserializeOwned + Send,
{
  type Rejection = Error;

  async fn from_request(req: Request, state: &S) -> Result<Self> {
    let Json(value) = Json::<T>::from_request(req, state)
      .await
      .map_err(|rejection| Error::Validation(rejection.body_text()))?;
    Ok(Self(value))
  }
}
