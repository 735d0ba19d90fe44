// foodcart/src/api/auth.rs

//! Account endpoints. Only the client side of the contract lives here.

use super::http::ApiTransport;
use crate::error::CartResult;
use crate::models::{LoginResponse, Profile};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use tracing::instrument;

pub const LOGIN_PATH: &str = "/api/auth/login";
// The backend exposes registration outside the /api prefix.
pub const REGISTER_PATH: &str = "/auth/register";
pub const ME_PATH: &str = "/api/auth/me";
pub const FORGOT_PASSWORD_PATH: &str = "/api/auth/forgot-password";
pub const RESET_PASSWORD_OTP_PATH: &str = "/api/auth/reset-password-otp";
pub const RESET_PASSWORD_PATH: &str = "/api/auth/reset-password";
pub const CHANGE_PASSWORD_PATH: &str = "/api/auth/change-password";

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
  pub username: String,
  pub email: String,
  pub password: String,
  pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpResetRequest {
  pub email: String,
  pub otp: String,
  pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResetRequest {
  pub token: String,
  pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
  pub old_password: String,
  pub new_password: String,
}

#[async_trait]
pub trait AuthApi: Send + Sync {
  async fn sign_in(&self, request: &SignInRequest) -> CartResult<LoginResponse>;
  async fn register(&self, request: &SignUpRequest) -> CartResult<()>;
  async fn get_me(&self) -> CartResult<Profile>;
  async fn update_me(&self, profile: &Profile) -> CartResult<()>;
  async fn send_otp(&self, email: &str) -> CartResult<()>;
  async fn reset_password_otp(&self, request: &OtpResetRequest) -> CartResult<()>;
  async fn reset_password(&self, request: &TokenResetRequest) -> CartResult<()>;
  async fn change_password(&self, request: &ChangePasswordRequest) -> CartResult<()>;
}

#[derive(Clone)]
pub struct AuthClient {
  transport: ApiTransport,
}

impl AuthClient {
  pub fn new(transport: ApiTransport) -> Self {
    Self { transport }
  }

  fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
    self.transport.request(Method::POST, path).json(body)
  }
}

#[async_trait]
impl AuthApi for AuthClient {
  #[instrument(name = "AuthApi::sign_in", skip_all, fields(username = %request.username))]
  async fn sign_in(&self, request: &SignInRequest) -> CartResult<LoginResponse> {
    self.transport.send_json(self.post(LOGIN_PATH, request)).await
  }

  #[instrument(name = "AuthApi::register", skip_all, fields(username = %request.username))]
  async fn register(&self, request: &SignUpRequest) -> CartResult<()> {
    self.transport.send_unit(self.post(REGISTER_PATH, request)).await
  }

  #[instrument(name = "AuthApi::get_me", skip(self))]
  async fn get_me(&self) -> CartResult<Profile> {
    self.transport.send_json(self.transport.request(Method::GET, ME_PATH)).await
  }

  #[instrument(name = "AuthApi::update_me", skip_all)]
  async fn update_me(&self, profile: &Profile) -> CartResult<()> {
    let request = self.transport.request(Method::PUT, ME_PATH).json(profile);
    self.transport.send_unit(request).await
  }

  #[instrument(name = "AuthApi::send_otp", skip(self))]
  async fn send_otp(&self, email: &str) -> CartResult<()> {
    let body = serde_json::json!({ "email": email });
    self.transport.send_unit(self.post(FORGOT_PASSWORD_PATH, &body)).await
  }

  #[instrument(name = "AuthApi::reset_password_otp", skip_all, fields(email = %request.email))]
  async fn reset_password_otp(&self, request: &OtpResetRequest) -> CartResult<()> {
    self.transport.send_unit(self.post(RESET_PASSWORD_OTP_PATH, request)).await
  }

  #[instrument(name = "AuthApi::reset_password", skip_all)]
  async fn reset_password(&self, request: &TokenResetRequest) -> CartResult<()> {
    self.transport.send_unit(self.post(RESET_PASSWORD_PATH, request)).await
  }

  #[instrument(name = "AuthApi::change_password", skip_all)]
  async fn change_password(&self, request: &ChangePasswordRequest) -> CartResult<()> {
    let request = self.transport.request(Method::PUT, CHANGE_PASSWORD_PATH).json(request);
    self.transport.send_unit(request).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_payloads_use_camel_case() {
    let otp = serde_json::to_value(OtpResetRequest {
      email: "lan@example.com".to_string(),
      otp: "123456".to_string(),
      new_password: "secret1".to_string(),
    })
    .unwrap();
    assert_eq!(
      otp,
      serde_json::json!({ "email": "lan@example.com", "otp": "123456", "newPassword": "secret1" })
    );

    let change = serde_json::to_value(ChangePasswordRequest {
      old_password: "a".to_string(),
      new_password: "b".to_string(),
    })
    .unwrap();
    assert_eq!(change, serde_json::json!({ "oldPassword": "a", "newPassword": "b" }));
  }
}
