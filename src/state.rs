use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

use crate::{
  auth::{CodeGenerator, RandomCodes, TokenIssuer},
  config::Config,
  prelude::*,
  sv,
};

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub tokens: TokenIssuer,
  pub codes: Box<dyn CodeGenerator>,
}

impl AppState {
  /// Connects to the configured database and brings its schema up to date.
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    Migrator::up(&db, None).await.context("Failed to run migrations")?;
    info!("Database ready");

    Ok(Self::with_db(db, config, Box::new(RandomCodes)))
  }

  pub fn with_db(
    db: DatabaseConnection,
    config: Config,
    codes: Box<dyn CodeGenerator>,
  ) -> Self {
    let tokens = TokenIssuer::new(&config.token_secret, config.token_ttl);
    Self { db, config, tokens, codes }
  }

  pub fn identity(&self) -> sv::Identity<'_> {
    sv::Identity::new(&self.db, &self.tokens, self.codes.as_ref())
  }

  pub fn events(&self) -> sv::Events<'_> {
    sv::Events::new(&self.db)
  }

  pub fn bookings(&self) -> sv::Bookings<'_> {
    sv::Bookings::new(&self.db)
  }

  pub fn coupons(&self) -> sv::Coupons<'_> {
    sv::Coupons::new(&self.db)
  }
}
