// foodcart/src/flow/control.rs

//! Signals a step returns, and the outcome of a whole flow run.

/// Returned by a step handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Go on with the next step.
  Continue,
  /// Halt the flow. Later steps do not run.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  /// Every step either ran or was skipped by its condition.
  Completed,
  /// A handler returned [`StepControl::Stop`].
  Stopped,
}

/// Result of a successful [`Flow::run`](super::Flow::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRun {
  pub outcome: FlowOutcome,
  /// Names of the steps whose handler ran, in order.
  pub executed: Vec<&'static str>,
}

impl FlowRun {
  pub fn ran(&self, step: &str) -> bool {
    self.executed.iter().any(|s| *s == step)
  }
}
