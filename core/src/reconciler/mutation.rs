// foodcart/src/reconciler/mutation.rs

//! Quantity change or removal on an existing order, followed by a refetch.

use super::common_steps::{refetch_order_step, REFETCH_ORDER};
use super::contexts::{ItemChange, MutationCtx};
use crate::error::CartResult;
use crate::flow::{ContextData, Flow, StepControl};
use tracing::instrument;

pub(crate) const FLOW_NAME: &str = "mutate_item";

pub(crate) fn mutation_flow() -> Flow<MutationCtx> {
  let mut flow: Flow<MutationCtx> = Flow::new(FLOW_NAME, &["apply_change", REFETCH_ORDER]);
  flow
    .on_step("apply_change", apply_change_step)
    .on_step(REFETCH_ORDER, refetch_order_step::<MutationCtx>);
  flow
}

#[instrument(name = "step::apply_change", skip(ctx), err)]
async fn apply_change_step(ctx: ContextData<MutationCtx>) -> CartResult<StepControl> {
  let (api, order_id, product_id, change) = {
    let guard = ctx.read();
    (guard.deps.api.clone(), guard.order_id, guard.product_id, guard.change)
  };
  match change {
    ItemChange::SetQuantity(quantity) => api.update_quantity(order_id, product_id, quantity).await?,
    ItemChange::Remove => api.remove_item(order_id, product_id).await?,
  }
  Ok(StepControl::Continue)
}
