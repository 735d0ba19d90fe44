// tests/config_tests.rs
mod common;

use common::setup_tracing;
use foodcart::config::{DEFAULT_BASE_URL, DEFAULT_CATALOG_PATH, DEFAULT_ORDERS_PATH, DEFAULT_TIMEOUT_SECS};
use foodcart::{CartError, ClientConfig};
use serial_test::serial;
use std::env;
use std::time::Duration;

const VARS: [&str; 5] = [
  "FOODCART_API_BASE_URL",
  "FOODCART_ORDERS_PATH",
  "FOODCART_CATALOG_PATH",
  "FOODCART_TIMEOUT_SECS",
  "FOODCART_SESSION_FILE",
];

fn clear_vars() {
  for var in VARS {
    env::remove_var(var);
  }
}

fn with_vars<R>(vars: &[(&str, &str)], body: impl FnOnce() -> R) -> R {
  setup_tracing();
  clear_vars();
  for (key, value) in vars {
    env::set_var(key, value);
  }
  let result = body();
  clear_vars();
  result
}

#[test]
#[serial]
fn defaults_apply_when_nothing_is_set() {
  let config = with_vars(&[], ClientConfig::from_env).unwrap();
  assert_eq!(config.base_url, DEFAULT_BASE_URL);
  assert_eq!(config.orders_path, DEFAULT_ORDERS_PATH);
  assert_eq!(config.catalog_path, DEFAULT_CATALOG_PATH);
  assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
}

#[test]
#[serial]
fn overrides_are_read_and_normalized() {
  let config = with_vars(
    &[
      ("FOODCART_API_BASE_URL", "http://localhost:8080/"),
      ("FOODCART_ORDERS_PATH", "api/orders/"),
      ("FOODCART_TIMEOUT_SECS", "5"),
      ("FOODCART_SESSION_FILE", "/tmp/foodcart-session.json"),
    ],
    ClientConfig::from_env,
  )
  .unwrap();

  assert_eq!(config.base_url, "http://localhost:8080");
  assert_eq!(config.orders_path, "/api/orders");
  assert_eq!(config.request_timeout, Duration::from_secs(5));
  assert_eq!(config.session_file.to_str(), Some("/tmp/foodcart-session.json"));
  assert_eq!(config.url("/api/orders/3"), "http://localhost:8080/api/orders/3");
}

#[test]
#[serial]
fn blank_values_fall_back_to_defaults() {
  let config = with_vars(&[("FOODCART_ORDERS_PATH", "   ")], ClientConfig::from_env).unwrap();
  assert_eq!(config.orders_path, DEFAULT_ORDERS_PATH);
}

#[test]
#[serial]
fn base_url_must_be_http() {
  let err = with_vars(&[("FOODCART_API_BASE_URL", "ftp://example.com")], ClientConfig::from_env).unwrap_err();
  assert!(matches!(err, CartError::Config(_)));
}

#[test]
#[serial]
fn timeout_must_be_a_positive_number() {
  let zero = with_vars(&[("FOODCART_TIMEOUT_SECS", "0")], ClientConfig::from_env).unwrap_err();
  assert!(matches!(zero, CartError::Config(_)));

  let junk = with_vars(&[("FOODCART_TIMEOUT_SECS", "soon")], ClientConfig::from_env).unwrap_err();
  assert!(matches!(junk, CartError::Config(_)));
  assert!(junk.to_string().contains("FOODCART_TIMEOUT_SECS"));
}
