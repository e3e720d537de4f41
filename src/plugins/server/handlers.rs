use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use json::{Value, json};

use super::extract::{BearerToken, Body, Session};
use crate::{
  auth::Capability,
  prelude::*,
  state::AppState,
  sv::{
    booking::{NewBookingReq, UpdateBookingReq},
    event::NewEventReq,
    identity::{SignInReq, SignUpReq},
  },
  utils::positive_int,
};

type App = State<Arc<AppState>>;

fn id(raw: &str) -> Result<i32> {
  positive_int(Some(&Value::String(raw.to_owned())), "id")
}

fn ok(data: impl serde::Serialize) -> Json<Value> {
  Json(json!({ "success": true, "data": data }))
}

pub async fn health() -> &'static str {
  "OK"
}

pub async fn sign_up(
  State(app): App,
  Body(req): Body<SignUpReq>,
) -> Result<impl IntoResponse> {
  let outcome = app.identity().sign_up(req.validate()?).await?;

  Ok((
    StatusCode::CREATED,
    Json(json!({
      "success": true,
      "message": "Account created",
      "data": outcome,
    })),
  ))
}

pub async fn sign_in(
  State(app): App,
  Body(req): Body<SignInReq>,
) -> Result<impl IntoResponse> {
  let session = app.identity().sign_in(req).await?;
  Ok(Json(json!({
    "success": true,
    "token": session.token,
    "user": session.user,
  })))
}

pub async fn keep_sign_in(
  State(app): App,
  BearerToken(token): BearerToken,
) -> Result<impl IntoResponse> {
  let session = app.identity().keep_sign_in(&token).await?;
  Ok(Json(json!({
    "success": true,
    "token": session.token,
    "user": session.user,
  })))
}

pub async fn coupons(
  State(app): App,
  session: Session,
) -> Result<impl IntoResponse> {
  Ok(ok(app.coupons().by_account(session.0.id).await?))
}

pub async fn list_events(State(app): App) -> Result<impl IntoResponse> {
  Ok(ok(app.events().all().await?))
}

pub async fn get_event(
  State(app): App,
  Path(raw): Path<String>,
) -> Result<impl IntoResponse> {
  Ok(ok(app.events().by_id(id(&raw)?).await?))
}

pub async fn create_event(
  State(app): App,
  session: Session,
  Body(req): Body<NewEventReq>,
) -> Result<impl IntoResponse> {
  session.require(Capability::ManageEvents)?;

  let event = app.events().create(req.validate()?).await?;
  Ok((StatusCode::CREATED, ok(event)))
}

/// Input is validated before the caller's token is looked at.
pub async fn create_booking(
  State(app): App,
  session: Result<Session>,
  Body(req): Body<NewBookingReq>,
) -> Result<impl IntoResponse> {
  let new = req.validate()?;
  let session = session?;
  let claims = session.require(Capability::BookSeats)?;

  let booking = app.bookings().create(claims.id, new).await?;
  Ok((StatusCode::CREATED, ok(booking)))
}

pub async fn list_bookings(State(app): App) -> Result<impl IntoResponse> {
  Ok(ok(app.bookings().all().await?))
}

pub async fn get_booking(
  State(app): App,
  Path(raw): Path<String>,
) -> Result<impl IntoResponse> {
  Ok(ok(app.bookings().by_id(id(&raw)?).await?))
}

pub async fn update_booking(
  State(app): App,
  Path(raw): Path<String>,
  Body(req): Body<UpdateBookingReq>,
) -> Result<impl IntoResponse> {
  let booking_id = id(&raw)?;
  let booking = app.bookings().update(booking_id, req.validate()?).await?;
  Ok(ok(booking))
}

pub async fn delete_booking(
  State(app): App,
  Path(raw): Path<String>,
) -> Result<impl IntoResponse> {
  app.bookings().delete(id(&raw)?).await?;
  Ok(StatusCode::NO_CONTENT)
}
