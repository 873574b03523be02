//! Variable-elimination inference.
//!
//! Queries eliminate every non-query variable (join the factors touching
//! it, then sum it out) and join what remains. All operations are pure:
//! the caller's network is never modified.

mod config;
mod elimination;

pub use config::{EliminationOrder, InferenceConfig};
pub use elimination::{compute_conditional, compute_marginal, eliminate, VariableElimination};
