use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::instrument;

use crate::domain::Event;
use crate::error::{BayesResult, InferenceError};
use crate::factor::{join_bounded, sum_out, Factor};
use crate::inference::InferenceConfig;
use crate::network::Network;

/// Variable-elimination engine.
///
/// The engine holds only configuration; networks are passed per call and
/// are never modified.
#[derive(Debug, Clone, Default)]
pub struct VariableElimination {
    config: InferenceConfig,
}

impl VariableElimination {
    /// Creates an engine after validating `config`.
    pub fn new(config: InferenceConfig) -> BayesResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Joins the factors mentioning `variable` and sums it out.
    ///
    /// The result holds the untouched factors followed by the reduced one.
    /// If no factor mentions `variable` the network is returned unchanged.
    pub fn eliminate(&self, network: &Network, variable: &str) -> BayesResult<Network> {
        let (with_var, without_var): (Vec<&Arc<Factor>>, Vec<&Arc<Factor>>) = network
            .factors()
            .iter()
            .partition(|f| f.contains(variable));

        if with_var.is_empty() {
            tracing::debug!(variable, "variable not referenced by any factor; nothing to eliminate");
            return Ok(network.clone());
        }

        let joined = join_bounded(
            with_var.iter().copied().map(Arc::as_ref),
            network.domains(),
            self.config.max_join_entries,
        )?;
        let reduced = sum_out(&joined, variable)?;

        tracing::debug!(
            variable,
            joined = with_var.len(),
            width = joined.scope().len(),
            entries = joined.len(),
            "eliminated variable"
        );

        let mut factors: Vec<Arc<Factor>> = without_var.into_iter().cloned().collect();
        factors.push(Arc::new(reduced));
        Ok(Network::from_parts(factors, Arc::clone(network.shared_domains())))
    }

    /// Computes the joint distribution over `query_vars`.
    ///
    /// Every other variable is eliminated in the configured order, then the
    /// remaining factors are joined. The result's scope is exactly the query
    /// set; an empty query yields the empty-scope factor holding the
    /// network's total mass.
    #[instrument(level = "debug", skip_all, fields(order = self.config.order.name()))]
    pub fn marginal<I, S>(&self, network: &Network, query_vars: I) -> BayesResult<Factor>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let query: BTreeSet<String> = query_vars
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        if let Some(unknown) = query.iter().find(|v| !network.contains_variable(v)) {
            return Err(InferenceError::UnknownQueryVariable {
                variable: unknown.clone(),
            }
            .into());
        }

        let sequence = self.config.order.sequence(network, &query)?;
        tracing::debug!(query = ?query, eliminate = ?sequence, "computing marginal");

        let mut working = network.clone();
        for variable in &sequence {
            working = self.eliminate(&working, variable)?;
        }

        join_bounded(
            working.factors().iter().map(Arc::as_ref),
            working.domains(),
            self.config.max_join_entries,
        )
    }

    /// Computes `P(event | evidence)`.
    ///
    /// Event and evidence are expected to be disjoint; where they overlap
    /// the evidence value is used.
    ///
    /// # Errors
    /// `ZeroProbabilityEvidence` if the evidence has prior probability 0,
    /// `NonFiniteResult` if the products overflow.
    #[instrument(level = "debug", skip_all, fields(event = %event, evidence = %evidence))]
    pub fn conditional(&self, network: &Network, event: &Event, evidence: &Event) -> BayesResult<f64> {
        let scope: BTreeSet<&str> = event.variables().chain(evidence.variables()).collect();
        let joint = self.marginal(network, scope)?;
        let numerator = joint.lookup(&event.merge(evidence))?;

        let evidence_marginal = self.marginal(network, evidence.variables())?;
        let denominator = evidence_marginal.lookup(evidence)?;
        if denominator == 0.0 {
            return Err(InferenceError::ZeroProbabilityEvidence {
                evidence: evidence.to_string(),
            }
            .into());
        }

        let probability = numerator / denominator;
        if !probability.is_finite() {
            return Err(InferenceError::NonFiniteResult {
                event: event.to_string(),
                evidence: evidence.to_string(),
            }
            .into());
        }
        Ok(probability)
    }
}

/// Eliminates `variable` from `network` with the default engine.
pub fn eliminate(network: &Network, variable: &str) -> BayesResult<Network> {
    VariableElimination::default().eliminate(network, variable)
}

/// Computes the joint distribution over `query_vars` with the default engine.
pub fn compute_marginal<I, S>(network: &Network, query_vars: I) -> BayesResult<Factor>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    VariableElimination::default().marginal(network, query_vars)
}

/// Computes `P(event | evidence)` with the default engine.
pub fn compute_conditional(network: &Network, event: &Event, evidence: &Event) -> BayesResult<f64> {
    VariableElimination::default().conditional(network, event, evidence)
}
