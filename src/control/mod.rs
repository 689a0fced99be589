//! Controller tree traversal engine.
//!
//! A [`PlanEngine`] owns all mutable traversal state for one virtual user's
//! private view of a shared [`crate::plan::PlanTree`]. Every call to
//! [`PlanEngine::next`] resolves either the next sampler to execute or an
//! exhaustion signal; exhaustion is a return value, never an error.
mod engine;
mod listeners;
mod random_order;


pub use engine::{Next, PlanEngine};
pub use listeners::{IterationEvent, IterationListener};
