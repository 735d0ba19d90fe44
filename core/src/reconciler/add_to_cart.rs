// foodcart/src/reconciler/add_to_cart.rs

//! resolve or create the order, persist its id, add the item, refetch.

use super::common_steps::{refetch_order_step, REFETCH_ORDER};
use super::contexts::AddToCartCtx;
use crate::api::ensure_quantity;
use crate::error::{CartError, CartResult};
use crate::flow::{ContextData, Flow, StepControl};
use tracing::{info, instrument};

pub(crate) const FLOW_NAME: &str = "add_to_cart";

pub(crate) fn add_to_cart_flow() -> Flow<AddToCartCtx> {
  let mut flow: Flow<AddToCartCtx> = Flow::new(
    FLOW_NAME,
    &[
      "validate_quantity",
      "resolve_order",
      "create_order",
      "persist_order_id",
      "add_item",
      REFETCH_ORDER,
    ],
  );

  flow
    .on_step("validate_quantity", validate_quantity_step)
    .on_step("resolve_order", resolve_order_step)
    .on_step("create_order", create_order_step)
    .on_step("persist_order_id", persist_order_id_step)
    .on_step("add_item", add_item_step)
    .on_step(REFETCH_ORDER, refetch_order_step::<AddToCartCtx>);

  flow.skip_if("create_order", |ctx| ctx.order_id.is_some());
  flow.skip_if("persist_order_id", |ctx| !ctx.created);
  flow
}

async fn validate_quantity_step(ctx: ContextData<AddToCartCtx>) -> CartResult<StepControl> {
  ensure_quantity(ctx.read().quantity)?;
  Ok(StepControl::Continue)
}

async fn resolve_order_step(ctx: ContextData<AddToCartCtx>) -> CartResult<StepControl> {
  let session = ctx.read().deps.session.clone();
  let order_id = session.get_current_order_id();
  ctx.write().order_id = order_id;
  Ok(StepControl::Continue)
}

#[instrument(name = "step::create_order", skip(ctx), err)]
async fn create_order_step(ctx: ContextData<AddToCartCtx>) -> CartResult<StepControl> {
  let api = ctx.read().deps.api.clone();
  let order_id = api.create_order().await?;
  info!(%order_id, "Created a new order for the session.");
  {
    let mut guard = ctx.write();
    guard.order_id = Some(order_id);
    guard.created = true;
  }
  Ok(StepControl::Continue)
}

async fn persist_order_id_step(ctx: ContextData<AddToCartCtx>) -> CartResult<StepControl> {
  let (session, order_id) = {
    let guard = ctx.read();
    (guard.deps.session.clone(), guard.order_id)
  };
  let order_id = order_id.ok_or(CartError::NoActiveOrder)?;
  session.set_current_order_id(order_id)?;
  Ok(StepControl::Continue)
}

#[instrument(name = "step::add_item", skip(ctx), err)]
async fn add_item_step(ctx: ContextData<AddToCartCtx>) -> CartResult<StepControl> {
  let (api, order_id, product_id, quantity) = {
    let guard = ctx.read();
    (guard.deps.api.clone(), guard.order_id, guard.product_id, guard.quantity)
  };
  let order_id = order_id.ok_or(CartError::NoActiveOrder)?;
  api.add_item(order_id, product_id, quantity).await?;
  Ok(StepControl::Continue)
}
