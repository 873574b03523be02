//! # varelim - Exact inference over discrete Bayesian networks
//!
//! varelim answers marginal and conditional probability queries over a
//! Bayesian network given as a set of factors (conditional probability
//! tables) over named discrete variables, using variable elimination.
//!
//! ## Core Concepts
//!
//! - **Factor**: A table mapping every joint assignment of an ordered scope to a non-negative real
//! - **DomainRegistry**: The ordered labels of every variable, shared by all factors
//! - **Network**: An immutable collection of factors plus the domain registry
//! - **Event**: An assignment of labels to some variables, used for lookups and evidence
//!
//! ## Usage
//!
//! ```rust
//! use varelim::{compute_conditional, compute_marginal, DomainRegistry, Event, Factor, Network};
//!
//! let domains = DomainRegistry::from_domains([("Rain", ["no", "yes"]), ("Wet", ["no", "yes"])])?;
//! let rain = Factor::from_fn(["Rain"], &domains, |a| if a[0] == "yes" { 0.2 } else { 0.8 })?;
//! let wet = Factor::from_fn(["Rain", "Wet"], &domains, |a| match (a[0].as_str(), a[1].as_str()) {
//!     ("yes", "yes") => 0.9,
//!     ("yes", _) => 0.1,
//!     (_, "yes") => 0.2,
//!     _ => 0.8,
//! })?;
//! let network = Network::new(vec![rain, wet], domains)?;
//!
//! let p_wet = compute_marginal(&network, ["Wet"])?.lookup(&Event::new().with("Wet", "yes"))?;
//! assert!((p_wet - 0.34).abs() < 1e-12);
//!
//! let p_rain = compute_conditional(
//!     &network,
//!     &Event::new().with("Rain", "yes"),
//!     &Event::new().with("Wet", "yes"),
//! )?;
//! assert!((p_rain - 0.18 / 0.34).abs() < 1e-12);
//! # Ok::<(), varelim::BayesError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types and the factor algebra
pub mod domain;
pub mod error;
pub mod factor;
pub mod network;

// Queries
pub mod inference;
pub mod runtime;

// Network producers
pub mod pedigree;

// Re-export primary types at crate root for convenience
pub use domain::{assignments, events, Assignment, DomainRegistry, Event};
pub use error::{BayesError, BayesResult, InferenceError, RuntimeError, ValidationError};
pub use factor::{join, sum_out, Factor, Table};
pub use inference::{
    compute_conditional, compute_marginal, eliminate, EliminationOrder, InferenceConfig,
    VariableElimination,
};
pub use network::Network;
pub use runtime::{InferenceRuntime, Query, QueryAnswer, QueryHandle, RuntimeConfig};
