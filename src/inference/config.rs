use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{InferenceError, ValidationError};
use crate::network::Network;

/// Order in which `compute_marginal` eliminates non-query variables.
///
/// Every order yields the same distribution up to floating-point rounding;
/// the choice only governs the size of intermediate joins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EliminationOrder {
    /// Variables in the order they first appear across the factor list.
    #[default]
    FirstAppearance,

    /// Variables sorted by name.
    Lexical,

    /// A caller-chosen order.
    ///
    /// Must name every non-query variable. Entries that are query variables
    /// or that no factor references are skipped.
    Explicit {
        /// Variables to eliminate, first to last.
        order: Vec<String>,
    },
}

impl EliminationOrder {
    /// Returns a short stable identifier suitable for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstAppearance => "first_appearance",
            Self::Lexical => "lexical",
            Self::Explicit { .. } => "explicit",
        }
    }

    /// The variables of `network` to eliminate for `query`, in order.
    pub(crate) fn sequence(
        &self,
        network: &Network,
        query: &BTreeSet<String>,
    ) -> Result<Vec<String>, InferenceError> {
        let hidden: Vec<String> = network
            .variables()
            .into_iter()
            .filter(|v| !query.contains(v))
            .collect();

        match self {
            Self::FirstAppearance => Ok(hidden),
            Self::Lexical => {
                let mut sorted = hidden;
                sorted.sort();
                Ok(sorted)
            }
            Self::Explicit { order } => {
                if let Some(missing) = hidden.iter().find(|v| !order.contains(v)) {
                    return Err(InferenceError::IncompleteEliminationOrder {
                        variable: missing.clone(),
                    });
                }
                let mut sequence: Vec<String> = Vec::with_capacity(hidden.len());
                for v in order {
                    if hidden.contains(v) && !sequence.contains(v) {
                        sequence.push(v.clone());
                    }
                }
                Ok(sequence)
            }
        }
    }
}

/// Inference configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Elimination order for non-query variables.
    pub order: EliminationOrder,

    /// Upper bound on the entries of any intermediate join. `None` is unbounded.
    pub max_join_entries: Option<usize>,
}

impl InferenceConfig {
    /// Returns this config with a different elimination order.
    #[must_use]
    pub fn with_order(mut self, order: EliminationOrder) -> Self {
        self.order = order;
        self
    }

    /// Returns this config with a join size bound.
    #[must_use]
    pub fn with_max_join_entries(mut self, limit: usize) -> Self {
        self.max_join_entries = Some(limit);
        self
    }

    /// Validates this config.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_join_entries == Some(0) {
            return Err(ValidationError::InvalidConfig {
                reason: "max_join_entries must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
