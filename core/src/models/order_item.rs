// foodcart/src/models/order_item.rs

use super::catalog::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product data captured when the line was added. Not kept in sync with the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
  pub id: ProductId,
  pub name: String,
  #[serde(default)]
  pub price: Decimal,
  #[serde(default)]
  pub image_url: Option<String>,
}

/// One line of an order. `subtotal` is server-computed (unit price x quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
  pub id: i64,
  pub quantity: u32,
  #[serde(default)]
  pub subtotal: Decimal,
  pub product: ProductSnapshot,
}
