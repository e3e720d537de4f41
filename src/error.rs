use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use sea_orm::DbErr;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("{0}")]
  Validation(String),
  #[error("Invalid date: {0}")]
  InvalidDate(String),
  #[error("End date must not be before start date")]
  InvalidRange,
  #[error("{0} must not be negative")]
  InvalidQuantity(&'static str),

  #[error("Email is already registered")]
  DuplicateEmail,
  #[error("Referral code does not exist")]
  InvalidReferral,
  #[error("Not enough seats available")]
  InsufficientInventory,

  #[error("Invalid email or password")]
  InvalidCredentials,
  #[error("Missing or invalid authorization token")]
  Unauthorized,
  #[error("Invalid or expired token")]
  InvalidToken,
  #[error("Access denied")]
  Forbidden,
  #[error("{0} not found")]
  NotFound(&'static str),
  #[error("{0} was changed by another request")]
  Conflict(&'static str),

  #[error("Database error: {0}")]
  Db(#[from] DbErr),
  #[error("{0}")]
  Internal(String),
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::Validation(_)
      | Self::InvalidDate(_)
      | Self::InvalidRange
      | Self::InvalidQuantity(_)
      | Self::DuplicateEmail
      | Self::InvalidReferral
      | Self::InsufficientInventory => StatusCode::BAD_REQUEST,
      Self::InvalidCredentials | Self::Unauthorized | Self::InvalidToken => {
        StatusCode::UNAUTHORIZED
      }
      Self::Forbidden => StatusCode::FORBIDDEN,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Db(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Machine readable code sent as `error` in the response body.
  pub fn code(&self) -> &'static str {
    match self {
      Self::Validation(_) => "ValidationError",
      Self::InvalidDate(_) => "InvalidDate",
      Self::InvalidRange => "InvalidRange",
      Self::InvalidQuantity(_) => "InvalidQuantity",
      Self::DuplicateEmail => "DuplicateEmail",
      Self::InvalidReferral => "InvalidReferral",
      Self::InsufficientInventory => "InsufficientInventory",
      Self::InvalidCredentials => "InvalidCredentials",
      Self::Unauthorized => "Unauthorized",
      Self::InvalidToken => "InvalidToken",
      Self::Forbidden => "Forbidden",
      Self::NotFound(_) => "NotFound",
      Self::Conflict(_) => "Conflict",
      Self::Db(_) | Self::Internal(_) => "ServerError",
    }
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }
}

/// Cause of a 500, attached to the response so a development-only layer
/// can surface it. Never serialized by default.
#[derive(Debug, Clone)]
pub struct InternalCause(pub String);

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();

    if status.is_server_error() {
      tracing::error!(code = self.code(), "request failed: {self}");

      let body = json::json!({
        "success": false,
        "error": self.code(),
        "message": "Internal server error",
      });
      let mut response = (status, Json(body)).into_response();
      response.extensions_mut().insert(InternalCause(self.to_string()));
      return response;
    }

    let body = json::json!({
      "success": false,
      "error": self.code(),
      "message": self.to_string(),
    });
    (status, Json(body)).into_response()
  }
}
