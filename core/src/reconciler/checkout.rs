// foodcart/src/reconciler/checkout.rs

//! confirm, then pay, then settle. Confirm is skipped for an order the server
//! already reports as confirmed, so a retry after a failed pay goes straight to
//! pay. A payment that hands back a hosted-checkout URL stops the flow before
//! settlement.

use super::contexts::CheckoutCtx;
use super::phase::CartPhase;
use crate::error::{CartError, CartResult};
use crate::flow::{ContextData, Flow, StepControl};
use crate::models::OrderStatus;
use tracing::{info, instrument, warn};

pub(crate) const FLOW_NAME: &str = "checkout";

pub(crate) fn checkout_flow() -> Flow<CheckoutCtx> {
  let mut flow: Flow<CheckoutCtx> = Flow::new(FLOW_NAME, &["confirm_order", "pay_order", "settle_order"]);
  flow
    .on_step("confirm_order", confirm_order_step)
    .on_step("pay_order", pay_order_step)
    .on_step("settle_order", settle_order_step);
  flow.skip_if("confirm_order", |ctx| ctx.confirmed);
  flow
}

#[instrument(name = "step::confirm_order", skip(ctx), err)]
async fn confirm_order_step(ctx: ContextData<CheckoutCtx>) -> CartResult<StepControl> {
  let (api, view, order_id) = {
    let guard = ctx.read();
    (guard.deps.api.clone(), guard.deps.view.clone(), guard.order_id)
  };
  api.confirm(order_id).await?;
  ctx.write().confirmed = true;

  let mut guard = view.write();
  guard.phase = CartPhase::Paying;
  if let Some(order) = guard.order.as_mut().filter(|o| o.id == order_id) {
    order.status = OrderStatus::Confirmed;
  }
  Ok(StepControl::Continue)
}

#[instrument(name = "step::pay_order", skip(ctx), err)]
async fn pay_order_step(ctx: ContextData<CheckoutCtx>) -> CartResult<StepControl> {
  let (api, order_id, method) = {
    let guard = ctx.read();
    (guard.deps.api.clone(), guard.order_id, guard.method)
  };
  let receipt = api.pay(order_id, method).await?;

  if method.expects_redirect() && receipt.redirect_url.is_none() {
    warn!(%order_id, %method, "Hosted checkout answered without a redirect URL.");
    return Err(CartError::Contract(format!(
      "{} payment for order {} returned no checkout URL",
      method, order_id
    )));
  }
  let control = match &receipt.redirect_url {
    Some(url) => {
      info!(%order_id, %method, redirect_url = %url, "Payment continues in an external checkout.");
      StepControl::Stop
    }
    None => StepControl::Continue,
  };
  ctx.write().receipt = Some(receipt);
  Ok(control)
}

async fn settle_order_step(ctx: ContextData<CheckoutCtx>) -> CartResult<StepControl> {
  let (session, order_id) = {
    let guard = ctx.read();
    (guard.deps.session.clone(), guard.order_id)
  };
  session.clear_current_order_id()?;
  info!(%order_id, "Order settled; session order id cleared.");
  Ok(StepControl::Continue)
}
