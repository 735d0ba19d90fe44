// foodcart/src/services/account_service.rs

//! Account actions: sign-in/out, registration, profile and password flows.
//!
//! Input is validated before any request. Sign-in and sign-out go through the
//! Session Store so the current order id never survives an account change.

use crate::api::{AuthApi, ChangePasswordRequest, OtpResetRequest, SignInRequest, SignUpRequest, TokenResetRequest};
use crate::error::{CartError, CartResult};
use crate::models::user::looks_like_email;
use crate::models::{AuthRecord, Profile};
use crate::reconciler::CartReconciler;
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
  pub username: String,
  pub email: String,
  pub password: String,
  pub confirm_password: String,
}

impl SignUpForm {
  pub fn validate(&self) -> CartResult<()> {
    if self.username.trim().is_empty() {
      return Err(CartError::Validation("Username is required".to_string()));
    }
    if !looks_like_email(&self.email) {
      return Err(CartError::Validation("Email address is not valid".to_string()));
    }
    validate_new_password(&self.password, &self.confirm_password)
  }
}

fn validate_new_password(password: &str, confirm: &str) -> CartResult<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(CartError::Validation(format!(
      "Password must be at least {} characters",
      MIN_PASSWORD_LEN
    )));
  }
  if password != confirm {
    return Err(CartError::Validation("Passwords do not match".to_string()));
  }
  Ok(())
}

fn require(value: &str, field: &str) -> CartResult<()> {
  if value.trim().is_empty() {
    return Err(CartError::Validation(format!("{} is required", field)));
  }
  Ok(())
}

#[derive(Clone)]
pub struct AccountService {
  auth: Arc<dyn AuthApi>,
  session: SessionStore,
  cart: Arc<CartReconciler>,
}

impl AccountService {
  pub fn new(auth: Arc<dyn AuthApi>, session: SessionStore, cart: Arc<CartReconciler>) -> Self {
    Self { auth, session, cart }
  }

  /// The signed-in account, if any.
  pub fn current_user(&self) -> Option<AuthRecord> {
    self.session.get_auth()
  }

  #[instrument(name = "AccountService::sign_in", skip(self, password))]
  pub async fn sign_in(&self, username: &str, password: &str) -> CartResult<AuthRecord> {
    require(username, "Username")?;
    require(password, "Password")?;

    let response = self
      .auth
      .sign_in(&SignInRequest {
        username: username.trim().to_string(),
        password: password.to_string(),
      })
      .await?;
    let record = AuthRecord::from(response);
    if record.token.as_deref().map_or(true, str::is_empty) {
      warn!("Login response carried no token.");
      return Err(CartError::Contract("login response has no token".to_string()));
    }

    self.session.save_auth(&record)?;
    self.cart.reset();
    info!(user = ?record.user.username, "Signed in.");
    Ok(record)
  }

  #[instrument(name = "AccountService::sign_up", skip_all, fields(username = %form.username))]
  pub async fn sign_up(&self, form: &SignUpForm) -> CartResult<()> {
    form.validate()?;
    self
      .auth
      .register(&SignUpRequest {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        roles: vec![DEFAULT_ROLE.to_string()],
      })
      .await?;
    info!("Account registered.");
    Ok(())
  }

  /// Clears the order id and the auth record, then empties the cart view.
  #[instrument(name = "AccountService::sign_out", skip(self))]
  pub fn sign_out(&self) -> CartResult<()> {
    self.session.clear_session()?;
    self.cart.reset();
    info!("Signed out.");
    Ok(())
  }

  pub async fn me(&self) -> CartResult<Profile> {
    self.auth.get_me().await
  }

  #[instrument(name = "AccountService::update_profile", skip_all)]
  pub async fn update_profile(&self, profile: &Profile) -> CartResult<()> {
    profile.validate().map_err(CartError::Validation)?;
    self.auth.update_me(profile).await
  }

  #[instrument(name = "AccountService::change_password", skip_all)]
  pub async fn change_password(&self, old_password: &str, new_password: &str, confirm: &str) -> CartResult<()> {
    require(old_password, "Current password")?;
    validate_new_password(new_password, confirm)?;
    self
      .auth
      .change_password(&ChangePasswordRequest {
        old_password: old_password.to_string(),
        new_password: new_password.to_string(),
      })
      .await
  }

  /// Asks the backend to e-mail a one-time code for a password reset.
  #[instrument(name = "AccountService::send_otp", skip(self))]
  pub async fn send_otp(&self, email: &str) -> CartResult<()> {
    if !looks_like_email(email) {
      return Err(CartError::Validation("Email address is not valid".to_string()));
    }
    self.auth.send_otp(email.trim()).await
  }

  #[instrument(name = "AccountService::reset_password_otp", skip(self, otp, new_password, confirm))]
  pub async fn reset_password_otp(&self, email: &str, otp: &str, new_password: &str, confirm: &str) -> CartResult<()> {
    if !looks_like_email(email) {
      return Err(CartError::Validation("Email address is not valid".to_string()));
    }
    require(otp, "OTP")?;
    validate_new_password(new_password, confirm)?;
    self
      .auth
      .reset_password_otp(&OtpResetRequest {
        email: email.trim().to_string(),
        otp: otp.trim().to_string(),
        new_password: new_password.to_string(),
      })
      .await
  }

  /// Reset through the token from a reset link.
  #[instrument(name = "AccountService::reset_password", skip_all)]
  pub async fn reset_password(&self, token: &str, new_password: &str, confirm: &str) -> CartResult<()> {
    require(token, "Reset token")?;
    validate_new_password(new_password, confirm)?;
    self
      .auth
      .reset_password(&TokenResetRequest {
        token: token.trim().to_string(),
        new_password: new_password.to_string(),
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form() -> SignUpForm {
    SignUpForm {
      username: "lan".to_string(),
      email: "lan@example.com".to_string(),
      password: "secret1".to_string(),
      confirm_password: "secret1".to_string(),
    }
  }

  #[test]
  fn sign_up_form_rules() {
    assert!(form().validate().is_ok());

    let mut blank_name = form();
    blank_name.username = "  ".to_string();
    assert!(matches!(blank_name.validate(), Err(CartError::Validation(_))));

    let mut bad_email = form();
    bad_email.email = "lan@".to_string();
    assert!(bad_email.validate().is_err());

    let mut short = form();
    short.password = "12345".to_string();
    short.confirm_password = "12345".to_string();
    assert!(short.validate().is_err());

    let mut mismatch = form();
    mismatch.confirm_password = "secret2".to_string();
    let err = mismatch.validate().unwrap_err();
    assert_eq!(err.to_string(), "Validation error: Passwords do not match");
  }
}
