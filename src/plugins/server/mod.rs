mod extract;
mod handlers;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
  Json, Router, middleware,
  response::{IntoResponse, Response},
  routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{error::InternalCause, prelude::*, state::AppState};

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));
    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;

    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let governor_limiter = governor_conf.limiter().clone();

    tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        governor_limiter.retain_recent();
      }
    });

    let router = router(app)
      .layer(GovernorLayer::new(governor_conf))
      .into_make_service_with_connect_info::<SocketAddr>();

    info!("HTTP Server listening on {addr}");

    tokio::spawn(async move {
      if let Err(err) = axum::serve(listener, router).await {
        error!("HTTP server stopped: {err}");
      }
    });

    Ok(())
  }
}

/// All routes with tracing and CORS, without the per-IP rate limiter.
pub fn router(app: Arc<AppState>) -> Router {
  let dev = app.config.environment.is_development();

  let router = Router::new()
    .route("/health", get(handlers::health))
    .route("/auth/register", post(handlers::sign_up))
    .route("/auth/signup", post(handlers::sign_up))
    .route("/auth/signin", post(handlers::sign_in))
    .route("/auth/keepsignin", get(handlers::keep_sign_in))
    .route("/auth/coupons", get(handlers::coupons))
    .route("/api/event", get(handlers::list_events))
    .route("/api/event/create-event", post(handlers::create_event))
    .route("/api/event/{id}", get(handlers::get_event))
    .route(
      "/api/transaction/event-transaction",
      get(handlers::list_bookings).post(handlers::create_booking),
    )
    .route(
      "/api/transaction/event-transaction/{id}",
      get(handlers::get_booking)
        .put(handlers::update_booking)
        .delete(handlers::delete_booking),
    )
    .with_state(app);

  let router = if dev {
    router.layer(middleware::map_response(expose_internal_cause))
  } else {
    router
  };

  router.layer(
    ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
      CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any),
    ),
  )
}

/// Development only: replaces the redacted 500 message with its cause.
async fn expose_internal_cause(response: Response) -> Response {
  let Some(InternalCause(cause)) = response.extensions().get().cloned() else {
    return response;
  };

  let body = json::json!({
    "success": false,
    "error": "ServerError",
    "message": cause,
  });
  (response.status(), Json(body)).into_response()
}
