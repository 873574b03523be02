//! Error types for varelim.
//!
//! All errors are strongly typed using thiserror, split by the phase
//! that raises them: input validation, query evaluation, and the
//! threaded query runtime.

use thiserror::Error;

use crate::pedigree::PedigreeError;

/// Errors raised when producer input breaks the network contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Domain for variable '{variable}' is empty")]
    EmptyDomain {
        variable: String,
    },

    #[error("Domain for variable '{variable}' lists value '{value}' more than once")]
    DuplicateDomainValue {
        variable: String,
        value: String,
    },

    #[error("Variable '{variable}' appears more than once in a factor scope")]
    DuplicateScopeVariable {
        variable: String,
    },

    #[error("Variable '{variable}' has no registered domain")]
    UnknownVariable {
        variable: String,
    },

    #[error("Assignment {assignment:?} has {actual} values but the scope has {expected}")]
    AssignmentArity {
        assignment: Vec<String>,
        expected: usize,
        actual: usize,
    },

    #[error("Assignment {assignment:?} is listed more than once")]
    DuplicateAssignment {
        assignment: Vec<String>,
    },

    #[error("Value '{value}' is not in the domain of '{variable}'")]
    ValueOutOfDomain {
        variable: String,
        value: String,
    },

    #[error("Factor value {value} at {assignment:?} must be finite and non-negative")]
    InvalidFactorValue {
        assignment: Vec<String>,
        value: f64,
    },

    #[error("Factor over {scope:?} has {actual} entries, expected {expected}")]
    IncompleteTable {
        scope: Vec<String>,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Errors raised while answering a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Event has no assignment for scope variable '{variable}'")]
    MissingVariable {
        variable: String,
    },

    #[error("No value assigned to {key:?} in factor over {scope:?}")]
    KeyNotFound {
        scope: Vec<String>,
        key: Vec<String>,
    },

    #[error("Evidence {evidence} has zero probability")]
    ZeroProbabilityEvidence {
        evidence: String,
    },

    #[error("Variable '{variable}' is not in factor scope {scope:?}")]
    VariableNotInScope {
        variable: String,
        scope: Vec<String>,
    },

    #[error("Query variable '{variable}' is not referenced by any factor")]
    UnknownQueryVariable {
        variable: String,
    },

    #[error("Elimination order does not name variable '{variable}'")]
    IncompleteEliminationOrder {
        variable: String,
    },

    #[error("Join over {scope:?} needs {entries} entries (limit: {limit})")]
    JoinLimitExceeded {
        scope: Vec<String>,
        entries: usize,
        limit: usize,
    },

    #[error("P({event} | {evidence}) is not a finite number")]
    NonFiniteResult {
        event: String,
        evidence: String,
    },
}

/// Errors raised by the threaded query runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("Query queue is full (capacity: {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Query workers are disconnected")]
    Disconnected,

    #[error("Query timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Failed to spawn query worker: {message}")]
    Spawn {
        message: String,
    },
}

/// Top-level error type for varelim.
#[derive(Debug, Error)]
pub enum BayesError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Pedigree error: {0}")]
    Pedigree(#[from] PedigreeError),

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl BayesError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an inference error.
    #[must_use]
    pub const fn is_inference(&self) -> bool {
        matches!(self, Self::Inference(_))
    }

    /// Returns true if this is a runtime error.
    #[must_use]
    pub const fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime(_))
    }

    /// Returns true if the query conditioned on impossible evidence.
    #[must_use]
    pub const fn is_zero_probability(&self) -> bool {
        matches!(
            self,
            Self::Inference(InferenceError::ZeroProbabilityEvidence { .. })
        )
    }
}

impl From<serde_json::Error> for BayesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for varelim operations.
pub type BayesResult<T> = Result<T, BayesError>;
