// foodcart/src/reconciler/common_steps.rs

use super::contexts::RefetchTarget;
use crate::error::{CartError, CartResult};
use crate::flow::{ContextData, StepControl};
use tracing::{debug, instrument};

pub(crate) const REFETCH_ORDER: &str = "refetch_order";

/// Fetches the authoritative order after a mutation. A failure here means the
/// mutation went through but the cart on display is out of date.
#[instrument(name = "step::refetch_order", skip(ctx), err)]
pub(crate) async fn refetch_order_step<T: RefetchTarget>(ctx: ContextData<T>) -> CartResult<StepControl> {
  let (api, order_id) = {
    let guard = ctx.read();
    (guard.deps().api.clone(), guard.target_order())
  };
  let order_id = order_id.ok_or(CartError::NoActiveOrder)?;

  match api.get_order(order_id).await {
    Ok(detail) => {
      debug!(%order_id, items = detail.items.len(), "Order refetched.");
      ctx.write().store_detail(detail);
      Ok(StepControl::Continue)
    }
    Err(source) => Err(CartError::RefetchFailed {
      order_id,
      source: Box::new(source),
    }),
  }
}
