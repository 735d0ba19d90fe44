// foodcart_cli/src/state.rs
use crate::cli::Cli;
use foodcart::{
  AccountService, ApiTransport, AuthClient, CartError, CartReconciler, CartResult, CatalogClient, ClientConfig,
  FileStore, HttpOrderClient, SessionStore,
};
use std::sync::Arc;

/// Everything a command needs, wired once per invocation.
#[derive(Clone)]
pub struct AppState {
  pub config: Arc<ClientConfig>,
  pub session: SessionStore,
  pub cart: Arc<CartReconciler>,
  pub accounts: AccountService,
  pub catalog: CatalogClient,
}

impl AppState {
  pub fn build(cli: &Cli) -> CartResult<Self> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
      if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(CartError::Config(format!("--base-url must be an http(s) URL, got '{}'", base_url)));
      }
      config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(session_file) = &cli.session_file {
      config.session_file = session_file.clone();
    }

    let session = SessionStore::new(Arc::new(FileStore::new(config.session_file.clone())));
    let transport = ApiTransport::new(config.clone(), session.clone())?;
    let cart = Arc::new(CartReconciler::new(
      Arc::new(HttpOrderClient::new(transport.clone())),
      session.clone(),
    ));
    let accounts = AccountService::new(
      Arc::new(AuthClient::new(transport.clone())),
      session.clone(),
      cart.clone(),
    );

    Ok(Self {
      config: Arc::new(config),
      session,
      cart,
      accounts,
      catalog: CatalogClient::new(transport),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[test]
  fn bad_base_url_override_is_a_config_error() {
    let cli = Cli::parse_from(["foodcart-cli", "--base-url", "backend.test", "cart"]);

    let err = match AppState::build(&cli) {
      Ok(_) => panic!("override without a scheme was accepted"),
      Err(e) => e,
    };

    assert!(matches!(err, CartError::Config(_)));
    assert!(err.user_message().starts_with("Configuration error: --base-url"));
  }
}
