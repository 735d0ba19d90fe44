// foodcart/src/flow/mod.rs

//! Named-step action flows. Each reconciler action is one flow: an ordered
//! list of steps sharing a [`ContextData`] state, with optional skip
//! conditions and early stop.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;

pub use context_data::ContextData;
pub use control::{FlowOutcome, FlowRun, StepControl};
pub use definition::{Flow, Handler, SkipCondition, StepDef};
