mod auth;
mod config;
mod entity;
mod error;
mod plugins;
mod prelude;
mod state;
mod sv;
mod utils;

use anyhow::Context;
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{config::Config, plugins::server, prelude::*, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "ticketing=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env().context("Invalid configuration")?;

  info!(
    "Starting Ticketing Server v{} ({:?})",
    env!("CARGO_PKG_VERSION"),
    config.environment
  );

  let app_state = Arc::new(AppState::new(config).await?);

  plugins::App::new().register(server::Plugin).run(app_state).await?;

  tokio::signal::ctrl_c().await.context("Failed to listen for shutdown")?;
  info!("Shutting down");

  Ok(())
}
