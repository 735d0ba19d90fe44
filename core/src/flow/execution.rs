// foodcart/src/flow/execution.rs

use super::context_data::ContextData;
use super::control::{FlowOutcome, FlowRun, StepControl};
use super::definition::Flow;
use crate::error::{CartError, CartResult};
use tracing::{event, span, Instrument, Level};

impl<T: Send + Sync + 'static> Flow<T> {
  /// Runs the steps in order against `ctx`.
  ///
  /// A step whose skip condition holds is passed over. The first handler
  /// error aborts the run and is returned as is; later steps never start.
  pub async fn run(&self, ctx: ContextData<T>) -> CartResult<FlowRun> {
    let flow_span = span!(Level::INFO, "flow_run", flow = self.name, num_steps = self.steps.len());
    self.run_steps(ctx).instrument(flow_span).await
  }

  async fn run_steps(&self, ctx: ContextData<T>) -> CartResult<FlowRun> {
    event!(Level::DEBUG, "Flow starting.");
    let mut executed = Vec::with_capacity(self.steps.len());

    for (step_index, step) in self.steps.iter().enumerate() {
      if let Some(condition) = &step.skip_if {
        let skip = {
          let guard = ctx.read();
          condition(&*guard)
        };
        if skip {
          event!(Level::DEBUG, step = step.name, "Step skipped by condition.");
          continue;
        }
      }

      let Some(handler) = self.handlers.get(step.name) else {
        event!(Level::ERROR, step = step.name, "Step has no handler.");
        return Err(CartError::HandlerMissing {
          flow: self.name,
          step: step.name,
        });
      };

      let step_span = span!(Level::DEBUG, "flow_step", step = step.name, step_index);
      let control = handler(ctx.clone()).instrument(step_span).await;
      executed.push(step.name);

      match control {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Stop) => {
          event!(Level::INFO, step = step.name, "Flow stopped by step.");
          return Ok(FlowRun {
            outcome: FlowOutcome::Stopped,
            executed,
          });
        }
        Err(e) => {
          event!(Level::WARN, step = step.name, error = %e, "Step failed; aborting flow.");
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Flow completed.");
    Ok(FlowRun {
      outcome: FlowOutcome::Completed,
      executed,
    })
  }
}
