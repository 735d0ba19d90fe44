// foodcart/src/config.rs

use crate::error::{CartError, CartResult};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://javatest-production-2db4.up.railway.app";
pub const DEFAULT_ORDERS_PATH: &str = "/api/customer/orders";
pub const DEFAULT_CATALOG_PATH: &str = "/api/admin";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_SESSION_FILE: &str = ".foodcart/session.json";

#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub base_url: String,
  /// Prefix of the order resource; the order routes are relative to it.
  pub orders_path: String,
  /// Prefix of the product and category resources.
  pub catalog_path: String,
  /// Applied to every request; nothing is retried.
  pub request_timeout: Duration,
  pub session_file: PathBuf,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      orders_path: DEFAULT_ORDERS_PATH.to_string(),
      catalog_path: DEFAULT_CATALOG_PATH.to_string(),
      request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
      session_file: PathBuf::from(DEFAULT_SESSION_FILE),
    }
  }
}

impl ClientConfig {
  pub fn from_env() -> CartResult<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let defaults = Self::default();

    let base_url = get_env("FOODCART_API_BASE_URL").unwrap_or(defaults.base_url);
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
      return Err(CartError::Config(format!(
        "FOODCART_API_BASE_URL must be an http(s) URL, got '{}'",
        base_url
      )));
    }

    let orders_path = normalize_prefix(get_env("FOODCART_ORDERS_PATH").unwrap_or(defaults.orders_path));
    let catalog_path = normalize_prefix(get_env("FOODCART_CATALOG_PATH").unwrap_or(defaults.catalog_path));

    let request_timeout = match get_env("FOODCART_TIMEOUT_SECS") {
      Some(raw) => {
        let secs = raw
          .trim()
          .parse::<u64>()
          .map_err(|e| CartError::Config(format!("Invalid FOODCART_TIMEOUT_SECS '{}': {}", raw, e)))?;
        if secs == 0 {
          return Err(CartError::Config("FOODCART_TIMEOUT_SECS must be greater than zero".to_string()));
        }
        Duration::from_secs(secs)
      }
      None => defaults.request_timeout,
    };

    let session_file = get_env("FOODCART_SESSION_FILE")
      .map(PathBuf::from)
      .unwrap_or(defaults.session_file);

    tracing::info!(%base_url, %orders_path, timeout_secs = request_timeout.as_secs(), "Client configuration loaded.");

    Ok(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      orders_path,
      catalog_path,
      request_timeout,
      session_file,
    })
  }

  /// Absolute URL for `path` (which starts with `/`).
  pub fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }
}

// "api/customer/orders/" -> "/api/customer/orders"
fn normalize_prefix(raw: String) -> String {
  let trimmed = raw.trim().trim_end_matches('/');
  if trimmed.starts_with('/') {
    trimmed.to_string()
  } else {
    format!("/{}", trimmed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prefixes_are_normalized() {
    assert_eq!(normalize_prefix("api/customer/orders/".to_string()), "/api/customer/orders");
    assert_eq!(normalize_prefix("/orders".to_string()), "/orders");
  }

  #[test]
  fn url_joins_base_and_path() {
    let cfg = ClientConfig {
      base_url: "http://localhost:8080/".to_string(),
      ..Default::default()
    };
    assert_eq!(cfg.url("/api/customer/orders/5"), "http://localhost:8080/api/customer/orders/5");
  }
}
