// foodcart/src/models/mod.rs

//! Data structures exchanged with the ordering backend and kept in the session.

pub mod catalog;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod user;

pub use catalog::{Category, Product, ProductId};
pub use order::{Order, OrderDetail, OrderId, OrderStatus};
pub use order_item::{OrderItem, ProductSnapshot};
pub use payment::{PaymentMethod, PaymentReceipt};
pub use user::{AuthRecord, LoginResponse, Profile, UserIdentity};

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Accepts RFC 3339 timestamps as well as the zone-less ISO form the backend
/// emits for `LocalDateTime`. Anything else becomes `None` instead of failing
/// the surrounding payload.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  Ok(raw.and_then(|s| {
    DateTime::parse_from_rfc3339(&s)
      .map(|dt| dt.naive_utc())
      .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f"))
      .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S"))
      .ok()
  }))
}
