// foodcart/src/models/order.rs

use super::order_item::OrderItem;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned order identifier. Never changes for the lifetime of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for OrderId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.trim().parse::<i64>().map(OrderId)
  }
}

/// Order lifecycle as reported by the backend.
///
/// The backend is not fully consistent across versions; any value not listed
/// here decodes as `Unknown` rather than failing the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  #[default]
  New,
  Pending,
  Confirmed,
  Preparing,
  Shipping,
  Paid,
  Delivered,
  Cancelled,
  #[serde(other)]
  Unknown,
}

impl OrderStatus {
  /// Items may still be added, changed or removed.
  pub fn is_mutable(self) -> bool {
    matches!(self, OrderStatus::New | OrderStatus::Pending)
  }

  /// The order is finished from the cart's point of view; its id must not be reused.
  pub fn is_settled(self) -> bool {
    matches!(self, OrderStatus::Paid | OrderStatus::Delivered | OrderStatus::Cancelled)
  }
}

/// Order header. `total_amount` is always server-computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: OrderId,
  #[serde(default)]
  pub total_amount: Decimal,
  #[serde(default)]
  pub status: OrderStatus,
  #[serde(default, deserialize_with = "super::lenient_timestamp")]
  pub created_at: Option<NaiveDateTime>,
}

/// Full state of one order: the single source of truth after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
  pub order: Order,
  #[serde(default)]
  pub items: Vec<OrderItem>,
}

impl OrderDetail {
  pub fn item_for(&self, product_id: super::ProductId) -> Option<&OrderItem> {
    self.items.iter().find(|item| item.product.id == product_id)
  }
}

/// Response of the create call. The id is optional here so a response that
/// omits it can be reported as a contract violation instead of a decode error.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedOrder {
  #[serde(default)]
  pub id: Option<OrderId>,
}
