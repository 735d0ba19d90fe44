// foodcart/src/reconciler/mod.rs

//! The Cart Reconciler: keeps the local cart view consistent with the
//! server-side order after every action.
//!
//! Each public method is an action boundary. Failures are recorded on the
//! view (`last_error`, `Error` phase) and returned as a typed [`CartError`];
//! nothing is retried and nothing panics.
//!
//! Every action draws a sequence number. A refetched order is shown only if
//! it belongs to an action newer than the one already on display, so a slow
//! response to an old tap cannot overwrite the result of a newer one.

mod add_to_cart;
mod checkout;
mod common_steps;
pub mod contexts;
mod mutation;
pub mod phase;

pub use contexts::{CartDeps, ItemChange};
pub use phase::{CartPhase, CartView, CheckoutOutcome, LastError, MutationOutcome};

use crate::api::{ensure_quantity, OrderApi};
use crate::error::{CartError, CartResult};
use crate::flow::{ContextData, Flow, FlowOutcome};
use crate::models::{Order, OrderDetail, OrderId, OrderStatus, PaymentMethod, ProductId};
use crate::session::SessionStore;
use contexts::{AddToCartCtx, CheckoutCtx, MutationCtx};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct CartReconciler {
  deps: CartDeps,
  seq: AtomicU64,
  // Adds and item changes that have not finished yet, refetch included.
  changes_in_flight: AtomicUsize,
  add_to_cart: Flow<AddToCartCtx>,
  mutation: Flow<MutationCtx>,
  checkout: Flow<CheckoutCtx>,
}

impl CartReconciler {
  pub fn new(api: Arc<dyn OrderApi>, session: SessionStore) -> Self {
    Self {
      deps: CartDeps {
        api,
        session,
        view: ContextData::default(),
      },
      seq: AtomicU64::new(0),
      changes_in_flight: AtomicUsize::new(0),
      add_to_cart: add_to_cart::add_to_cart_flow(),
      mutation: mutation::mutation_flow(),
      checkout: checkout::checkout_flow(),
    }
  }

  pub fn session(&self) -> &SessionStore {
    &self.deps.session
  }

  /// A copy of the current cart view.
  pub fn snapshot(&self) -> CartView {
    self.deps.view.snapshot()
  }

  pub fn phase(&self) -> CartPhase {
    self.deps.view.read().phase.clone()
  }

  fn next_seq(&self) -> u64 {
    self.seq.fetch_add(1, Ordering::SeqCst) + 1
  }

  /// Records the outcome of an action on the view and hands it back.
  fn conclude<R>(&self, result: CartResult<R>, from_checkout: bool) -> CartResult<R> {
    match &result {
      Ok(_) => self.deps.view.write().last_error = None,
      Err(e) => {
        warn!(error = %e, kind = ?e.kind(), "Cart action failed.");
        self.deps.view.write().record_failure(e, from_checkout);
      }
    }
    result
  }

  /// Registers an add or item change. Refused while a checkout is in flight.
  /// The registration is checked and taken under the view lock, the same lock
  /// [`CartReconciler::begin_checkout`] holds, so the two never overlap.
  fn begin_change(&self) -> CartResult<ChangeGuard<'_>> {
    let view = self.deps.view.write();
    if view.phase.is_checkout_in_flight() {
      // No id left means the running checkout has already settled.
      if let Some(order_id) = self.deps.session.get_current_order_id().or_else(|| view.order_id()) {
        return Err(CartError::CheckoutInProgress(order_id));
      }
    }
    self.changes_in_flight.fetch_add(1, Ordering::SeqCst);
    Ok(ChangeGuard(&self.changes_in_flight))
  }

  fn apply(&self, seq: u64, detail: Option<OrderDetail>) {
    if let Some(detail) = detail {
      if !self.deps.view.write().apply_detail(seq, detail) {
        debug!(seq, "Discarded refetch from an older action.");
      }
    }
  }

  // --- Mount ---

  /// Resumes the persisted order, if any. An order the server no longer knows,
  /// or one that is already settled, is forgotten and the cart starts empty.
  #[instrument(name = "CartReconciler::load", skip(self))]
  pub async fn load(&self) -> CartResult<CartView> {
    let seq = self.next_seq();
    let result = self.load_inner(seq).await;
    self.conclude(result, false).map(|_| self.snapshot())
  }

  async fn load_inner(&self, seq: u64) -> CartResult<()> {
    let Some(order_id) = self.deps.session.get_current_order_id() else {
      self.deps.view.write().clear_to(seq, CartPhase::NoActiveOrder);
      return Ok(());
    };

    match self.deps.api.get_order(order_id).await {
      Ok(detail) if detail.order.status.is_settled() => {
        info!(%order_id, status = ?detail.order.status, "Persisted order is already settled; starting a new cart.");
        self.deps.session.clear_current_order_id()?;
        self.deps.view.write().clear_to(seq, CartPhase::NoActiveOrder);
        Ok(())
      }
      Ok(detail) => {
        let mut view = self.deps.view.write();
        let awaiting = match &view.phase {
          CartPhase::AwaitingPayment { redirect_url } if view.order_id() == Some(order_id) => Some(redirect_url.clone()),
          _ => None,
        };
        view.apply_detail(seq, detail);
        if let Some(redirect_url) = awaiting {
          view.phase = CartPhase::AwaitingPayment { redirect_url };
        }
        Ok(())
      }
      Err(e) if e.is_not_found() => {
        info!(%order_id, "Persisted order no longer exists; clearing it.");
        self.deps.session.clear_current_order_id()?;
        self.deps.view.write().clear_to(seq, CartPhase::NoActiveOrder);
        Ok(())
      }
      Err(e) => Err(e),
    }
  }

  // --- Item mutations ---

  /// Adds `quantity` of a product, creating the session's order first if
  /// there is none. Returns the order the item went into.
  #[instrument(name = "CartReconciler::add_to_cart", skip(self))]
  pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> CartResult<OrderId> {
    let result = self.add_to_cart_inner(product_id, quantity).await;
    self.conclude(result, false)
  }

  async fn add_to_cart_inner(&self, product_id: ProductId, quantity: u32) -> CartResult<OrderId> {
    let _change = self.begin_change()?;
    let seq = self.next_seq();
    let ctx = ContextData::new(AddToCartCtx {
      deps: self.deps.clone(),
      product_id,
      quantity,
      order_id: None,
      created: false,
      detail: None,
    });
    self.add_to_cart.run(ctx.clone()).await?;

    let (order_id, detail) = {
      let mut guard = ctx.write();
      (guard.order_id, guard.detail.take())
    };
    self.apply(seq, detail);
    order_id.ok_or(CartError::NoActiveOrder)
  }

  #[instrument(name = "CartReconciler::increment", skip(self))]
  pub async fn increment(&self, product_id: ProductId) -> CartResult<MutationOutcome> {
    let result = match self.current_quantity(product_id) {
      Ok(quantity) => match quantity.checked_add(1) {
        Some(next) => self.mutate(product_id, ItemChange::SetQuantity(next)).await,
        None => Err(CartError::InvalidQuantity(quantity)),
      },
      Err(e) => Err(e),
    };
    self.conclude(result, false)
  }

  /// Lowers the quantity by one. At quantity one nothing is sent; removal is
  /// the only way to drop a line.
  #[instrument(name = "CartReconciler::decrement", skip(self))]
  pub async fn decrement(&self, product_id: ProductId) -> CartResult<MutationOutcome> {
    let result = match self.current_quantity(product_id) {
      Ok(quantity) if quantity <= 1 => {
        debug!(%product_id, "Decrement at quantity 1 ignored.");
        Ok(MutationOutcome::Ignored)
      }
      Ok(quantity) => self.mutate(product_id, ItemChange::SetQuantity(quantity - 1)).await,
      Err(e) => Err(e),
    };
    self.conclude(result, false)
  }

  #[instrument(name = "CartReconciler::set_quantity", skip(self))]
  pub async fn set_quantity(&self, product_id: ProductId, quantity: u32) -> CartResult<MutationOutcome> {
    let result = match ensure_quantity(quantity) {
      Ok(quantity) => self.mutate(product_id, ItemChange::SetQuantity(quantity)).await,
      Err(e) => Err(e),
    };
    self.conclude(result, false)
  }

  #[instrument(name = "CartReconciler::remove", skip(self))]
  pub async fn remove(&self, product_id: ProductId) -> CartResult<MutationOutcome> {
    let result = self.mutate(product_id, ItemChange::Remove).await;
    self.conclude(result, false)
  }

  fn current_quantity(&self, product_id: ProductId) -> CartResult<u32> {
    self
      .deps
      .view
      .read()
      .quantity_of(product_id)
      .ok_or(CartError::ItemNotInCart(product_id))
  }

  async fn mutate(&self, product_id: ProductId, change: ItemChange) -> CartResult<MutationOutcome> {
    let _change = self.begin_change()?;
    let order_id = self
      .deps
      .session
      .get_current_order_id()
      .ok_or(CartError::NoActiveOrder)?;
    let seq = self.next_seq();
    let ctx = ContextData::new(MutationCtx {
      deps: self.deps.clone(),
      order_id,
      product_id,
      change,
      detail: None,
    });
    self.mutation.run(ctx.clone()).await?;

    let detail = ctx.write().detail.take();
    self.apply(seq, detail);
    Ok(MutationOutcome::Applied)
  }

  // --- Checkout ---

  /// Confirms and pays the session's order. A direct payment settles the
  /// cart and clears the order id. A hosted checkout leaves the order id in
  /// place and returns the URL to open.
  #[instrument(name = "CartReconciler::checkout", skip(self))]
  pub async fn checkout(&self, method: PaymentMethod) -> CartResult<CheckoutOutcome> {
    let (order_id, confirmed) = match self.begin_checkout() {
      Ok(claimed) => claimed,
      Err(e) => return self.conclude(Err(e), false),
    };
    let seq = self.next_seq();
    let result = self.checkout_inner(seq, order_id, confirmed, method).await;
    self.conclude(result, true)
  }

  /// Claims the checkout slot. The checks and the phase change happen under one
  /// write lock, so two checkouts cannot both pass and no add or item change
  /// can still be running once confirm goes out.
  ///
  /// Also reports whether the order on display is already confirmed, in which
  /// case only pay is sent.
  fn begin_checkout(&self) -> CartResult<(OrderId, bool)> {
    let order_id = self
      .deps
      .session
      .get_current_order_id()
      .ok_or(CartError::NoActiveOrder)?;
    let mut view = self.deps.view.write();
    if view.phase.is_checkout_in_flight() {
      return Err(CartError::CheckoutInProgress(order_id));
    }
    if self.changes_in_flight.load(Ordering::SeqCst) > 0 {
      return Err(CartError::ChangesInProgress(order_id));
    }
    let confirmed = view
      .order
      .as_ref()
      .map_or(false, |o| o.id == order_id && o.status == OrderStatus::Confirmed);
    view.phase = if confirmed {
      CartPhase::Paying
    } else {
      CartPhase::Confirming
    };
    Ok((order_id, confirmed))
  }

  async fn checkout_inner(
    &self,
    seq: u64,
    order_id: OrderId,
    confirmed: bool,
    method: PaymentMethod,
  ) -> CartResult<CheckoutOutcome> {
    let ctx = ContextData::new(CheckoutCtx {
      deps: self.deps.clone(),
      order_id,
      method,
      confirmed,
      receipt: None,
    });
    let run = self.checkout.run(ctx.clone()).await?;

    let redirect_url = ctx.read().redirect_url().map(str::to_string);
    let mut view = self.deps.view.write();
    match (run.outcome, redirect_url) {
      (FlowOutcome::Stopped, Some(redirect_url)) => {
        view.applied_seq = view.applied_seq.max(seq);
        view.phase = CartPhase::AwaitingPayment {
          redirect_url: redirect_url.clone(),
        };
        Ok(CheckoutOutcome::AwaitingPayment { order_id, redirect_url })
      }
      (FlowOutcome::Completed, _) => {
        view.clear_to(seq, CartPhase::Settled);
        Ok(CheckoutOutcome::Settled { order_id })
      }
      (FlowOutcome::Stopped, None) => Err(CartError::Internal(format!(
        "checkout for order {} stopped without a checkout URL",
        order_id
      ))),
    }
  }

  // --- Reads ---

  #[instrument(name = "CartReconciler::history", skip(self))]
  pub async fn history(&self) -> CartResult<Vec<Order>> {
    let result = self.deps.api.get_history().await;
    self.conclude(result, false)
  }

  #[instrument(name = "CartReconciler::order_detail", skip(self))]
  pub async fn order_detail(&self, order_id: OrderId) -> CartResult<OrderDetail> {
    let result = self.deps.api.get_order(order_id).await;
    self.conclude(result, false)
  }

  // --- View housekeeping ---

  /// Dismisses the recorded error and returns to the phase the cart rests in.
  pub fn acknowledge_error(&self) {
    let has_order = self.deps.session.get_current_order_id().is_some();
    let mut view = self.deps.view.write();
    view.last_error = None;
    if view.phase == CartPhase::Error {
      view.phase = view.resting_phase(has_order);
    }
  }

  /// Forgets everything on display, e.g. after a sign-in or sign-out. Storage
  /// is not touched. Refetches still in flight are discarded.
  pub fn reset(&self) {
    let seq = self.next_seq();
    self.deps.view.write().clear_to(seq, CartPhase::NoActiveOrder);
  }
}

/// Counts one add or item change for as long as it is alive.
struct ChangeGuard<'a>(&'a AtomicUsize);

impl Drop for ChangeGuard<'_> {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::SeqCst);
  }
}
