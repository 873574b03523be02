//! Bayesian networks as immutable factor collections.
//!
//! A [`Network`] shares its factors and its domain registry by `Arc`, so the
//! networks produced by elimination are cheap to build and never alias
//! mutable state with the caller's network.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::domain::DomainRegistry;
use crate::error::{BayesResult, ValidationError};
use crate::factor::Factor;

/// A collection of factors over variables drawn from one domain registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkRepr", into = "NetworkRepr")]
pub struct Network {
    factors: Vec<Arc<Factor>>,
    domains: Arc<DomainRegistry>,
}

impl Network {
    /// Creates a validated network.
    ///
    /// Every factor must reference only registered variables, use only legal
    /// labels, and list every combination of its scope's labels.
    pub fn new(factors: Vec<Factor>, domains: DomainRegistry) -> Result<Self, ValidationError> {
        for factor in &factors {
            factor.validate_against(&domains)?;
        }
        Ok(Self {
            factors: factors.into_iter().map(Arc::new).collect(),
            domains: Arc::new(domains),
        })
    }

    /// Builds a network from already-validated parts.
    pub(crate) fn from_parts(factors: Vec<Arc<Factor>>, domains: Arc<DomainRegistry>) -> Self {
        Self { factors, domains }
    }

    /// Parses and validates a network from JSON.
    pub fn from_json(json: &str) -> BayesResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses and validates a network from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> BayesResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serializes the network as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> BayesResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The factors, in network order.
    #[must_use]
    pub fn factors(&self) -> &[Arc<Factor>] {
        &self.factors
    }

    /// The shared domain registry.
    #[must_use]
    pub fn domains(&self) -> &DomainRegistry {
        &self.domains
    }

    pub(crate) fn shared_domains(&self) -> &Arc<DomainRegistry> {
        &self.domains
    }

    /// Union of all factor scopes, in first-appearance order.
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        let mut variables: Vec<String> = Vec::new();
        for factor in &self.factors {
            for variable in factor.scope() {
                if !variables.contains(variable) {
                    variables.push(variable.clone());
                }
            }
        }
        variables
    }

    /// Returns true if any factor references `variable`.
    #[must_use]
    pub fn contains_variable(&self, variable: &str) -> bool {
        self.factors.iter().any(|f| f.contains(variable))
    }

    /// Stable content digest of the domains and the ordered factors.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut h = Hasher::new();
        for (variable, labels) in self.domains.iter() {
            update_str(&mut h, variable);
            h.update(&(labels.len() as u64).to_le_bytes());
            for label in labels {
                update_str(&mut h, label);
            }
        }
        h.update(&(self.factors.len() as u64).to_le_bytes());
        for factor in &self.factors {
            h.update(&(factor.scope().len() as u64).to_le_bytes());
            for variable in factor.scope() {
                update_str(&mut h, variable);
            }
            for (key, value) in factor.table() {
                for label in key {
                    update_str(&mut h, label);
                }
                h.update(&value.to_bits().to_le_bytes());
            }
        }
        h.finalize().to_hex().to_string()
    }
}

// Length-prefixed so that adjacent strings cannot collide.
fn update_str(h: &mut Hasher, s: &str) {
    h.update(&(s.len() as u64).to_le_bytes());
    h.update(s.as_bytes());
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, factor) in self.factors.iter().enumerate() {
            if i > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "{factor}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NetworkRepr {
    domains: DomainRegistry,
    factors: Vec<Factor>,
}

impl TryFrom<NetworkRepr> for Network {
    type Error = ValidationError;

    fn try_from(repr: NetworkRepr) -> Result<Self, Self::Error> {
        Network::new(repr.factors, repr.domains)
    }
}

impl From<Network> for NetworkRepr {
    fn from(network: Network) -> Self {
        Self {
            domains: Arc::unwrap_or_clone(network.domains),
            factors: network
                .factors
                .into_iter()
                .map(Arc::unwrap_or_clone)
                .collect(),
        }
    }
}
