// foodcart/src/models/payment.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
  /// Cash on delivery.
  #[serde(rename = "CASH")]
  Cash,
  /// Mobile wallet.
  #[serde(rename = "MOMO")]
  Momo,
  /// Bank/card gateway settled synchronously by the backend.
  #[serde(rename = "VNPAY")]
  VnPay,
  /// Hosted checkout page; confirmation arrives out of band.
  #[serde(rename = "PAYOS")]
  PayOs,
}

impl PaymentMethod {
  pub const ALL: [PaymentMethod; 4] = [
    PaymentMethod::Cash,
    PaymentMethod::Momo,
    PaymentMethod::VnPay,
    PaymentMethod::PayOs,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      PaymentMethod::Cash => "CASH",
      PaymentMethod::Momo => "MOMO",
      PaymentMethod::VnPay => "VNPAY",
      PaymentMethod::PayOs => "PAYOS",
    }
  }

  /// The pay response carries a URL the user must open to finish paying.
  pub fn expects_redirect(self) -> bool {
    matches!(self, PaymentMethod::PayOs)
  }
}

impl fmt::Display for PaymentMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PaymentMethod {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_ascii_uppercase();
    PaymentMethod::ALL
      .into_iter()
      .find(|m| m.as_str() == wanted)
      .ok_or_else(|| format!("unknown payment method '{}' (expected CASH, MOMO, VNPAY or PAYOS)", s))
  }
}

/// Body of the pay request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PayRequest {
  pub payment_method: PaymentMethod,
}

/// What the client consumes from a pay response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
  #[serde(default, alias = "checkoutUrl", alias = "paymentUrl")]
  pub redirect_url: Option<String>,
}

impl PaymentReceipt {
  /// Pay responses range from an empty body to a full bill; only the redirect
  /// URL matters, so anything undecodable is a receipt without one.
  pub fn from_body(body: &[u8]) -> Self {
    if body.iter().all(u8::is_ascii_whitespace) {
      return PaymentReceipt::default();
    }
    match serde_json::from_slice::<PaymentReceipt>(body) {
      Ok(receipt) => receipt,
      Err(e) => {
        tracing::debug!(error = %e, "Pay response is not a JSON object; treating as receipt without redirect.");
        PaymentReceipt::default()
      }
    }
  }
}
