// foodcart/src/reconciler/contexts.rs

//! State carried through each reconciler flow. Handlers receive these
//! wrapped in [`ContextData`](crate::flow::ContextData).

use super::phase::CartView;
use crate::api::OrderApi;
use crate::flow::ContextData;
use crate::models::{OrderDetail, OrderId, PaymentMethod, PaymentReceipt, ProductId};
use crate::session::SessionStore;
use std::sync::Arc;

/// Collaborators every flow needs.
#[derive(Clone)]
pub struct CartDeps {
  pub api: Arc<dyn OrderApi>,
  pub session: SessionStore,
  pub view: ContextData<CartView>,
}

#[derive(Clone)]
pub struct AddToCartCtx {
  pub deps: CartDeps,
  pub product_id: ProductId,
  pub quantity: u32,
  pub order_id: Option<OrderId>,
  /// Set when this run created the order.
  pub created: bool,
  pub detail: Option<OrderDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemChange {
  SetQuantity(u32),
  Remove,
}

#[derive(Clone)]
pub struct MutationCtx {
  pub deps: CartDeps,
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub change: ItemChange,
  pub detail: Option<OrderDetail>,
}

#[derive(Clone)]
pub struct CheckoutCtx {
  pub deps: CartDeps,
  pub order_id: OrderId,
  pub method: PaymentMethod,
  /// The server already accepted `confirm` for this order.
  pub confirmed: bool,
  pub receipt: Option<PaymentReceipt>,
}

impl CheckoutCtx {
  pub fn redirect_url(&self) -> Option<&str> {
    self.receipt.as_ref().and_then(|r| r.redirect_url.as_deref())
  }
}

/// Flow state that ends with a refetch of the order it touched.
pub(crate) trait RefetchTarget: Send + Sync + 'static {
  fn deps(&self) -> &CartDeps;
  fn target_order(&self) -> Option<OrderId>;
  fn store_detail(&mut self, detail: OrderDetail);
}

impl RefetchTarget for AddToCartCtx {
  fn deps(&self) -> &CartDeps {
    &self.deps
  }

  fn target_order(&self) -> Option<OrderId> {
    self.order_id
  }

  fn store_detail(&mut self, detail: OrderDetail) {
    self.detail = Some(detail);
  }
}

impl RefetchTarget for MutationCtx {
  fn deps(&self) -> &CartDeps {
    &self.deps
  }

  fn target_order(&self) -> Option<OrderId> {
    Some(self.order_id)
  }

  fn store_detail(&mut self, detail: OrderDetail) {
    self.detail = Some(detail);
  }
}
