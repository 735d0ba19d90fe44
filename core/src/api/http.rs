// foodcart/src/api/http.rs

//! Shared HTTP plumbing for the typed clients: base URL, bearer token,
//! request/response logging, and the mapping of failures onto [`CartError`].

use crate::config::ClientConfig;
use crate::error::{CartError, CartResult};
use crate::session::SessionStore;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_LOGGED_BODY: usize = 200;

#[derive(Clone)]
pub struct ApiTransport {
  client: Client,
  config: Arc<ClientConfig>,
  session: SessionStore,
}

impl ApiTransport {
  pub fn new(config: ClientConfig, session: SessionStore) -> CartResult<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = Client::builder()
      .timeout(config.request_timeout)
      .default_headers(headers)
      .build()
      .map_err(|e| CartError::Config(format!("HTTP client could not be built: {}", e)))?;

    Ok(Self {
      client,
      config: Arc::new(config),
      session,
    })
  }

  pub fn config(&self) -> &ClientConfig {
    &self.config
  }

  pub fn session(&self) -> &SessionStore {
    &self.session
  }

  /// Starts a request for `path`. The session's bearer token is attached when
  /// one is stored; without one the request goes out unauthenticated.
  pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let builder = self.client.request(method, self.config.url(path));
    match self.session.token() {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  /// Sends the request and returns the response if its status is 2xx.
  pub(crate) async fn execute(&self, builder: RequestBuilder) -> CartResult<Response> {
    let request = builder
      .build()
      .map_err(|e| CartError::Internal(format!("request could not be built: {}", e)))?;
    let method = request.method().clone();
    let url = request.url().path().to_string();
    debug!(%method, %url, "Sending request.");

    let response = self.client.execute(request).await.map_err(|e| {
      warn!(%method, %url, error = %e, timed_out = e.is_timeout(), "Request failed before a response arrived.");
      transport_error(e)
    })?;

    let status = response.status();
    if status.is_success() {
      info!(%method, %url, status = status.as_u16(), "Response received.");
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(
      %method,
      %url,
      status = status.as_u16(),
      body = %truncate(&body),
      "Request rejected by server."
    );
    Err(CartError::Rejected {
      status: status.as_u16(),
      message: extract_message(&body),
    })
  }

  pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> CartResult<T> {
    let body = self.send_bytes(builder).await?;
    serde_json::from_slice(&body).map_err(|e| {
      warn!(error = %e, body = %truncate(&String::from_utf8_lossy(&body)), "Response body did not match the expected shape.");
      CartError::Contract(format!("response body could not be decoded: {}", e))
    })
  }

  pub(crate) async fn send_bytes(&self, builder: RequestBuilder) -> CartResult<Vec<u8>> {
    let response = self.execute(builder).await?;
    let bytes = response.bytes().await.map_err(transport_error)?;
    Ok(bytes.to_vec())
  }

  pub(crate) async fn send_unit(&self, builder: RequestBuilder) -> CartResult<()> {
    self.execute(builder).await.map(|_| ())
  }
}

fn transport_error(e: reqwest::Error) -> CartError {
  CartError::Transport {
    message: e.to_string(),
    timed_out: e.is_timeout(),
  }
}

/// Pulls a human-readable message out of an error body: the `message` or
/// `error` field of a JSON object, a bare JSON string, or the plain text itself.
pub(crate) fn extract_message(body: &str) -> Option<String> {
  let trimmed = body.trim();
  if trimmed.is_empty() {
    return None;
  }
  match serde_json::from_str::<serde_json::Value>(trimmed) {
    Ok(serde_json::Value::Object(map)) => ["message", "error"]
      .iter()
      .filter_map(|field| map.get(*field).and_then(|v| v.as_str()))
      .map(str::trim)
      .find(|s| !s.is_empty())
      .map(str::to_string),
    Ok(serde_json::Value::String(s)) => Some(s).filter(|s| !s.trim().is_empty()),
    Ok(_) => None,
    Err(_) => Some(truncate(trimmed)),
  }
}

fn truncate(body: &str) -> String {
  if body.chars().count() <= MAX_LOGGED_BODY {
    return body.to_string();
  }
  let mut cut: String = body.chars().take(MAX_LOGGED_BODY).collect();
  cut.push('…');
  cut
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{AuthRecord, UserIdentity};
  use reqwest::header::AUTHORIZATION;

  fn transport() -> ApiTransport {
    let config = ClientConfig {
      base_url: "http://backend.test".to_string(),
      ..Default::default()
    };
    ApiTransport::new(config, SessionStore::in_memory()).unwrap()
  }

  #[test]
  fn message_is_taken_from_json_fields() {
    assert_eq!(
      extract_message(r#"{"message":"Order not found","status":404}"#).as_deref(),
      Some("Order not found")
    );
    assert_eq!(
      extract_message(r#"{"message":"","error":"Bad Request"}"#).as_deref(),
      Some("Bad Request")
    );
    assert_eq!(extract_message(r#""OTP expired""#).as_deref(), Some("OTP expired"));
    assert_eq!(extract_message("Insufficient stock").as_deref(), Some("Insufficient stock"));
    assert_eq!(extract_message("  "), None);
    assert_eq!(extract_message(r#"{"status":500}"#), None);
  }

  #[test]
  fn requests_without_a_token_are_unauthenticated() {
    let t = transport();
    let request = t.request(Method::GET, "/api/customer/orders").build().unwrap();
    assert!(request.headers().get(AUTHORIZATION).is_none());
    assert_eq!(request.url().as_str(), "http://backend.test/api/customer/orders");
  }

  #[test]
  fn stored_token_is_sent_as_bearer() {
    let t = transport();
    t.session()
      .save_auth(&AuthRecord {
        token: Some("jwt-abc".to_string()),
        user: UserIdentity::default(),
      })
      .unwrap();
    let request = t.request(Method::GET, "/api/auth/me").build().unwrap();
    assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "Bearer jwt-abc");
  }

  #[test]
  fn long_bodies_are_truncated_for_logs() {
    let long = "x".repeat(500);
    assert_eq!(truncate(&long).chars().count(), MAX_LOGGED_BODY + 1);
  }
}
