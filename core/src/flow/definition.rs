// foodcart/src/flow/definition.rs

//! `Flow<T>`: an ordered list of named steps and the handler bound to each.

use super::context_data::ContextData;
use super::control::StepControl;
use crate::error::CartResult;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Evaluated against the flow state before a step; `true` skips the step.
pub type SkipCondition<T> = Arc<dyn Fn(&T) -> bool + Send + Sync + 'static>;

pub type StepFuture = Pin<Box<dyn Future<Output = CartResult<StepControl>> + Send>>;

/// A step handler. It receives its own clone of the shared state.
pub type Handler<T> = Box<dyn Fn(ContextData<T>) -> StepFuture + Send + Sync>;

#[derive(Clone)]
pub struct StepDef<T: Send + Sync + 'static> {
  pub name: &'static str,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: Send + Sync + 'static> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}

pub struct Flow<T: Send + Sync + 'static> {
  pub(crate) name: &'static str,
  pub(crate) steps: Vec<StepDef<T>>,
  pub(crate) handlers: HashMap<&'static str, Handler<T>>,
}

impl<T: Send + Sync + 'static> Flow<T> {
  pub fn new(name: &'static str, steps: &[&'static str]) -> Self {
    let mut flow = Self {
      name,
      steps: Vec::with_capacity(steps.len()),
      handlers: HashMap::new(),
    };
    for step in steps {
      flow.ensure_step_not_exists(step);
      flow.steps.push(StepDef { name: step, skip_if: None });
    }
    flow
  }

  // Unknown or duplicate step names are wiring mistakes, not runtime failures.
  fn ensure_step_exists(&self, step: &str) {
    if !self.steps.iter().any(|s| s.name == step) {
      panic!("Flow '{}' setup error: step '{}' is not defined.", self.name, step);
    }
  }

  fn ensure_step_not_exists(&self, step: &str) {
    if self.steps.iter().any(|s| s.name == step) {
      panic!("Flow '{}' setup error: step '{}' is defined twice.", self.name, step);
    }
  }

  /// Skips `step` whenever `condition` holds for the state at that point.
  pub fn skip_if(&mut self, step: &str, condition: impl Fn(&T) -> bool + Send + Sync + 'static) -> &mut Self {
    self.ensure_step_exists(step);
    if let Some(def) = self.steps.iter_mut().find(|s| s.name == step) {
      def.skip_if = Some(Arc::new(condition));
    }
    self
  }

  /// Binds the handler for `step`, replacing any earlier one.
  pub fn on_step<F, Fut>(&mut self, step: &'static str, handler: F) -> &mut Self
  where
    F: Fn(ContextData<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CartResult<StepControl>> + Send + 'static,
  {
    self.ensure_step_exists(step);
    let boxed: Handler<T> = Box::new(move |ctx| Box::pin(handler(ctx)));
    self.handlers.insert(step, boxed);
    self
  }
}
