// foodcart/src/reconciler/phase.rs

//! The reconciled cart as the presentation layer sees it.

use crate::error::{CartError, ErrorKind};
use crate::models::{Order, OrderDetail, OrderId, OrderItem, ProductId};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CartPhase {
  /// No order id is persisted; the next add creates an order.
  #[default]
  NoActiveOrder,
  /// An order id is persisted and the order accepts item changes.
  Building,
  /// `confirm` is in flight.
  Confirming,
  /// `pay` is in flight.
  Paying,
  /// A hosted checkout was opened. The order id stays persisted until the
  /// payment is observed as settled on a later load.
  AwaitingPayment { redirect_url: String },
  /// Payment completed; the order id has been cleared.
  Settled,
  /// The last action failed. Order and items still show the last good state.
  Error,
}

impl CartPhase {
  pub fn is_checkout_in_flight(&self) -> bool {
    matches!(self, CartPhase::Confirming | CartPhase::Paying)
  }
}

/// Failure of the last action, kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
  pub kind: ErrorKind,
  /// Text suitable for an alert.
  pub message: String,
  /// Full error chain, for logs and diagnostics.
  pub detail: String,
}

impl From<&CartError> for LastError {
  fn from(error: &CartError) -> Self {
    Self {
      kind: error.kind(),
      message: error.user_message(),
      detail: error.to_string(),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct CartView {
  pub phase: CartPhase,
  pub order: Option<Order>,
  pub items: Vec<OrderItem>,
  /// The last refetch failed; `order` and `items` may be out of date.
  pub stale: bool,
  pub last_error: Option<LastError>,
  /// Sequence number of the action whose server state is on display.
  pub applied_seq: u64,
}

impl CartView {
  pub fn order_id(&self) -> Option<OrderId> {
    self.order.as_ref().map(|o| o.id)
  }

  pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
    self
      .items
      .iter()
      .find(|item| item.product.id == product_id)
      .map(|item| item.quantity)
  }

  /// Server-computed total, if an order is on display.
  pub fn total(&self) -> Option<Decimal> {
    self.order.as_ref().map(|o| o.total_amount)
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Replaces order and items with `detail` if `seq` is newer than what is
  /// on display. Returns whether it was applied.
  pub(crate) fn apply_detail(&mut self, seq: u64, detail: OrderDetail) -> bool {
    if seq <= self.applied_seq {
      return false;
    }
    self.applied_seq = seq;
    self.order = Some(detail.order);
    self.items = detail.items;
    self.stale = false;
    if !self.phase.is_checkout_in_flight() {
      self.phase = CartPhase::Building;
    }
    true
  }

  /// Empties the cart and moves to `phase`, discarding refetches from
  /// actions up to `seq`.
  pub(crate) fn clear_to(&mut self, seq: u64, phase: CartPhase) {
    self.applied_seq = self.applied_seq.max(seq);
    self.order = None;
    self.items.clear();
    self.stale = false;
    self.last_error = None;
    self.phase = phase;
  }

  /// Records `error`. A failure that did not come from the running checkout
  /// leaves a `Confirming`/`Paying` phase untouched.
  pub(crate) fn record_failure(&mut self, error: &CartError, from_checkout: bool) {
    self.last_error = Some(LastError::from(error));
    if matches!(error, CartError::RefetchFailed { .. }) {
      self.stale = true;
    }
    if from_checkout || !self.phase.is_checkout_in_flight() {
      self.phase = CartPhase::Error;
    }
  }

  /// Phase to return to once an error has been acknowledged.
  pub(crate) fn resting_phase(&self, has_persisted_order: bool) -> CartPhase {
    if has_persisted_order || self.order.is_some() {
      CartPhase::Building
    } else {
      CartPhase::NoActiveOrder
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
  /// The change was sent and followed by a refetch.
  Applied,
  /// Nothing was sent, e.g. decrement at quantity one.
  Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
  Settled { order_id: OrderId },
  AwaitingPayment { order_id: OrderId, redirect_url: String },
}
