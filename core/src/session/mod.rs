// foodcart/src/session/mod.rs

//! The Session Store: the only place that reads or writes the persisted
//! authentication record and the current-order identifier.
//!
//! Reads never fail. A backend error or an undecodable value is logged and
//! reported as absent. Writes return a typed result so the action that
//! triggered them can surface the failure.
//!
//! Composite clears remove the order id *before* the auth record. If the
//! process dies between the two writes, the survivor is a signed-in session
//! without a cart, never a cart id that outlived its owner.

pub mod file_store;
pub mod kv;

pub use file_store::FileStore;
pub use kv::{KeyValueStore, MemoryStore};

use crate::error::{CartResult, StorageError};
use crate::models::{AuthRecord, OrderId};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const AUTH_KEY: &str = "auth";
pub const CURRENT_ORDER_KEY: &str = "currentOrderId";

#[derive(Clone)]
pub struct SessionStore {
  backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionStore").finish_non_exhaustive()
  }
}

impl SessionStore {
  pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
    Self { backend }
  }

  /// A store backed by [`MemoryStore`].
  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryStore::new()))
  }

  // --- Authentication record ---

  /// Persists `record`, replacing any previous one. The current order id is
  /// dropped first so a cart never leaks from one account into the next.
  #[instrument(name = "SessionStore::save_auth", skip_all, fields(user = ?record.user.username))]
  pub fn save_auth(&self, record: &AuthRecord) -> CartResult<()> {
    self.clear_current_order_id()?;
    let encoded = serde_json::to_string(record).map_err(StorageError::from)?;
    self.backend.set(AUTH_KEY, &encoded)?;
    debug!("Auth record saved.");
    Ok(())
  }

  pub fn get_auth(&self) -> Option<AuthRecord> {
    let raw = self.read_key(AUTH_KEY)?;
    match serde_json::from_str::<AuthRecord>(&raw) {
      Ok(record) => Some(record),
      Err(e) => {
        warn!(error = %e, "Stored auth record is unreadable; treating as signed out.");
        None
      }
    }
  }

  /// Bearer token of the stored auth record, if any.
  pub fn token(&self) -> Option<String> {
    self.get_auth().and_then(|record| record.token).filter(|t| !t.is_empty())
  }

  /// Signs the session out. Same as [`SessionStore::clear_session`].
  pub fn clear_auth(&self) -> CartResult<()> {
    self.clear_session()
  }

  /// Clears both keys: the order id first, then the auth record.
  #[instrument(name = "SessionStore::clear_session", skip(self))]
  pub fn clear_session(&self) -> CartResult<()> {
    self.clear_current_order_id()?;
    self.backend.remove(AUTH_KEY)?;
    debug!("Session cleared.");
    Ok(())
  }

  // --- Current order id ---

  pub fn get_current_order_id(&self) -> Option<OrderId> {
    let raw = self.read_key(CURRENT_ORDER_KEY)?;
    match raw.parse::<OrderId>() {
      Ok(id) => Some(id),
      Err(e) => {
        warn!(value = %raw, error = %e, "Stored order id is not a number; ignoring it.");
        None
      }
    }
  }

  pub fn set_current_order_id(&self, id: OrderId) -> CartResult<()> {
    self.backend.set(CURRENT_ORDER_KEY, &id.to_string())?;
    debug!(order_id = %id, "Current order id persisted.");
    Ok(())
  }

  pub fn clear_current_order_id(&self) -> CartResult<()> {
    self.backend.remove(CURRENT_ORDER_KEY)?;
    Ok(())
  }

  fn read_key(&self, key: &str) -> Option<String> {
    match self.backend.get(key) {
      Ok(value) => value,
      Err(e) => {
        warn!(key, error = %e, "Session storage read failed; treating value as absent.");
        None
      }
    }
  }
}
