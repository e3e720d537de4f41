use std::env;

use anyhow::{Context, bail};

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
  Development,
  #[default]
  Production,
}

impl Environment {
  pub fn parse(s: &str) -> Self {
    match s.trim().to_ascii_lowercase().as_str() {
      "development" | "dev" => Self::Development,
      _ => Self::Production,
    }
  }

  pub fn is_development(self) -> bool {
    self == Self::Development
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub database_url: String,
  pub token_secret: String,
  pub token_ttl: Duration,
  pub environment: Environment,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
    let port = match var("PORT") {
      Some(port) => port.parse().with_context(|| format!("Invalid PORT `{port}`"))?,
      None => 3000,
    };

    let database_url =
      var("DATABASE_URL").unwrap_or_else(|| "sqlite:ticketing.db?mode=rwc".into());

    let Some(token_secret) = var("JWT_SECRET").or_else(|| var("TOKEN_KEY")) else {
      bail!("JWT_SECRET (or TOKEN_KEY) not set");
    };
    if token_secret.is_empty() {
      bail!("JWT_SECRET must not be empty");
    }

    let token_ttl = match var("TOKEN_TTL") {
      Some(ttl) => humantime::parse_duration(&ttl)
        .with_context(|| format!("Invalid TOKEN_TTL `{ttl}`"))?,
      None => Duration::from_secs(24 * 3600),
    };

    let environment = var("APP_ENV")
      .or_else(|| var("NODE_ENV"))
      .map(|env| Environment::parse(&env))
      .unwrap_or_default();

    Ok(Self { port, database_url, token_secret, token_ttl, environment })
  }
}
