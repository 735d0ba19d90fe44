// foodcart/src/models/user.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
  #[serde(default)]
  pub id: Option<i64>,
  #[serde(default)]
  pub username: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub roles: Vec<String>,
}

/// What is persisted under the `auth` key: bearer token plus who it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
  #[serde(default)]
  pub token: Option<String>,
  #[serde(default)]
  pub user: UserIdentity,
}

/// Sign-in response. Depending on the backend version the token arrives as
/// `token` or `accessToken`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
  #[serde(default)]
  pub token: Option<String>,
  #[serde(default)]
  pub access_token: Option<String>,
  #[serde(default)]
  pub id: Option<i64>,
  #[serde(default)]
  pub username: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub roles: Vec<String>,
}

impl From<LoginResponse> for AuthRecord {
  fn from(resp: LoginResponse) -> Self {
    AuthRecord {
      token: non_empty(resp.token).or_else(|| non_empty(resp.access_token)),
      user: UserIdentity {
        id: resp.id,
        username: resp.username,
        email: resp.email,
        roles: resp.roles,
      },
    }
  }
}

fn non_empty(token: Option<String>) -> Option<String> {
  token.filter(|t| !t.trim().is_empty())
}

/// Editable account details (`/api/auth/me`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  #[serde(default)]
  pub full_name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub address: String,
  #[serde(default)]
  pub image_url: Option<String>,
}

impl Profile {
  /// Checks the same fields the profile form checks before submitting.
  pub fn validate(&self) -> Result<(), String> {
    if self.full_name.trim().is_empty() {
      return Err("Full name is required".to_string());
    }
    if !looks_like_email(&self.email) {
      return Err("Email address is not valid".to_string());
    }
    let digits = self.phone.chars().filter(char::is_ascii_digit).count();
    if !(10..=11).contains(&digits) {
      return Err("Phone number must have 10 or 11 digits".to_string());
    }
    Ok(())
  }
}

/// `local@domain.tld` with no whitespace: the same shape the sign-up and profile
/// forms accept.
pub fn looks_like_email(candidate: &str) -> bool {
  let candidate = candidate.trim();
  if candidate.is_empty() || candidate.chars().any(char::is_whitespace) {
    return false;
  }
  match candidate.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain
          .split_once('.')
          .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
    }
    None => false,
  }
}
