// foodcart/src/error.rs

//! Error taxonomy for the cart client.
//!
//! Every failure path ends in a [`CartError`]. The UI layer (or the CLI) matches on
//! [`CartError::kind`] to decide how to present it and calls
//! [`CartError::user_message`] for the text to show.

use crate::models::{OrderId, ProductId};
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures of the device-local key-value storage.
#[derive(Debug, Error)]
pub enum StorageError {
  #[error("Storage backend failure: {0:#}")]
  Backend(#[from] AnyhowError),

  #[error("Stored value could not be (de)serialized: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Stored value for key '{key}' is malformed: {detail}")]
  Malformed { key: String, detail: String },
}

#[derive(Debug, Error)]
pub enum CartError {
  #[error("Storage error: {0}")]
  Storage(#[from] StorageError),

  #[error("Network error: {message}")]
  Transport { message: String, timed_out: bool },

  #[error("Request rejected with status {status}: {}", .message.as_deref().unwrap_or("no detail"))]
  Rejected { status: u16, message: Option<String> },

  /// The server answered successfully but not with what the protocol promised
  /// (e.g. a created order without an id).
  #[error("Unexpected server response: {0}")]
  Contract(String),

  #[error("Invalid quantity: {0}. Quantity must be at least 1")]
  InvalidQuantity(u32),

  #[error("No active order in the current session")]
  NoActiveOrder,

  #[error("Product {0} is not in the cart")]
  ItemNotInCart(ProductId),

  #[error("Checkout already in progress for order {0}")]
  CheckoutInProgress(OrderId),

  #[error("Cart changes for order {0} are still being applied. Try again in a moment")]
  ChangesInProgress(OrderId),

  #[error("Order {order_id} was changed but could not be refreshed: {source}")]
  RefetchFailed {
    order_id: OrderId,
    #[source]
    source: Box<CartError>,
  },

  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Flow '{flow}' has no handler for step '{step}'")]
  HandlerMissing { flow: &'static str, step: &'static str },

  #[error("Internal error: {0}")]
  Internal(String),
}

/// Coarse classification of a [`CartError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Local storage could not be read or written.
  Storage,
  /// Timeout or connectivity loss; the operation was not applied.
  Network,
  /// The backend refused the request (validation, missing order, stock...).
  Rejected,
  /// The backend broke the response contract; the current action was aborted.
  Contract,
  /// Bad input caught on the client before any request.
  Input,
  /// The mutation went through but the refreshed state is unavailable.
  Stale,
  Internal,
}

impl CartError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      CartError::Storage(_) => ErrorKind::Storage,
      CartError::Transport { .. } => ErrorKind::Network,
      CartError::Rejected { .. } => ErrorKind::Rejected,
      CartError::Contract(_) => ErrorKind::Contract,
      CartError::InvalidQuantity(_)
      | CartError::NoActiveOrder
      | CartError::ItemNotInCart(_)
      | CartError::CheckoutInProgress(_)
      | CartError::ChangesInProgress(_)
      | CartError::Validation(_) => ErrorKind::Input,
      CartError::RefetchFailed { .. } => ErrorKind::Stale,
      CartError::Config(_) | CartError::HandlerMissing { .. } | CartError::Internal(_) => ErrorKind::Internal,
    }
  }

  /// True when the backend reported that the resource does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(self, CartError::Rejected { status: 404, .. })
  }

  /// Text suitable for an alert. Server-provided text wins; otherwise a generic
  /// message for the error class.
  pub fn user_message(&self) -> String {
    match self {
      CartError::Rejected {
        message: Some(message), ..
      } if !message.trim().is_empty() => message.clone(),
      CartError::Rejected { status: 404, .. } => "The requested order could not be found.".to_string(),
      CartError::Rejected { .. } => "The server could not process the request. Please try again.".to_string(),
      CartError::Transport { timed_out: true, .. } => "The server took too long to respond. Please try again.".to_string(),
      CartError::Transport { .. } => "Could not reach the server. Check your connection and try again.".to_string(),
      CartError::Storage(_) => "Local data could not be saved. Please try again.".to_string(),
      CartError::Contract(_) | CartError::Internal(_) | CartError::HandlerMissing { .. } => {
        "Something went wrong. Please try again.".to_string()
      }
      CartError::RefetchFailed { .. } => "Your cart was updated but could not be refreshed. Reload the cart to see its current state.".to_string(),
      CartError::InvalidQuantity(_)
      | CartError::NoActiveOrder
      | CartError::ItemNotInCart(_)
      | CartError::CheckoutInProgress(_)
      | CartError::ChangesInProgress(_)
      | CartError::Validation(_)
      | CartError::Config(_) => self.to_string(),
    }
  }
}

// Backend helpers use anyhow for context; anything that escapes untyped is internal.
impl From<AnyhowError> for CartError {
  fn from(err: AnyhowError) -> Self {
    if let Some(storage) = err.downcast_ref::<StorageError>() {
      return CartError::Internal(format!("storage: {}", storage));
    }
    CartError::Internal(format!("{:#}", err))
  }
}

pub type CartResult<T, E = CartError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn server_text_is_preferred_for_rejections() {
    let err = CartError::Rejected {
      status: 409,
      message: Some("Sản phẩm đã hết hàng".to_string()),
    };
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(err.user_message(), "Sản phẩm đã hết hàng");
  }

  #[test]
  fn blank_server_text_falls_back_to_generic_message() {
    let err = CartError::Rejected {
      status: 500,
      message: Some("   ".to_string()),
    };
    assert_eq!(err.user_message(), "The server could not process the request. Please try again.");
  }

  #[test]
  fn not_found_is_detected_only_for_404() {
    assert!(CartError::Rejected { status: 404, message: None }.is_not_found());
    assert!(!CartError::Rejected { status: 400, message: None }.is_not_found());
    assert!(!CartError::NoActiveOrder.is_not_found());
  }

  #[test]
  fn refetch_failure_is_classified_as_stale() {
    let err = CartError::RefetchFailed {
      order_id: OrderId(501),
      source: Box::new(CartError::Transport {
        message: "connection reset".to_string(),
        timed_out: false,
      }),
    };
    assert_eq!(err.kind(), ErrorKind::Stale);
    assert!(err.to_string().contains("501"));
  }
}
