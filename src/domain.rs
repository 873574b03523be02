//! Variable domains, events, and assignment enumeration.
//!
//! A [`DomainRegistry`] is shared by every factor of a network and is never
//! mutated by the engine. An [`Event`] assigns one label to each of some
//! variables and is used both to index factors and to state evidence.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A full assignment of a factor scope, one label per scope variable.
pub type Assignment = Vec<String>;

/// Mapping from variable name to its ordered list of distinct labels.
///
/// - Empty domains are rejected.
/// - Duplicate labels are rejected (not deduplicated: a duplicate label
///   would make factor tables ambiguous).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DomainRegistry(BTreeMap<String, Vec<String>>);

impl DomainRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a validated registry from `(variable, labels)` pairs.
    ///
    /// A later pair for the same variable replaces the earlier one.
    pub fn from_domains<I, K, V, L>(domains: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = L>,
        L: Into<String>,
    {
        domains
            .into_iter()
            .try_fold(Self::new(), |registry, (variable, labels)| {
                registry.with_domain(variable, labels)
            })
    }

    /// Returns a registry with `variable` mapped to `labels`.
    pub fn with_domain<K, V, L>(mut self, variable: K, labels: V) -> Result<Self, ValidationError>
    where
        K: Into<String>,
        V: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let variable = variable.into();
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(ValidationError::EmptyDomain { variable });
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(ValidationError::DuplicateDomainValue {
                    variable,
                    value: label.clone(),
                });
            }
        }

        self.0.insert(variable, labels);
        Ok(self)
    }

    /// Returns the labels of `variable`, if registered.
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&[String]> {
        self.0.get(variable).map(Vec::as_slice)
    }

    /// Returns the labels of `variable` or an `UnknownVariable` error.
    pub fn domain(&self, variable: &str) -> Result<&[String], ValidationError> {
        self.get(variable)
            .ok_or_else(|| ValidationError::UnknownVariable {
                variable: variable.to_string(),
            })
    }

    /// Returns true if `variable` has a registered domain.
    #[must_use]
    pub fn contains(&self, variable: &str) -> bool {
        self.0.contains_key(variable)
    }

    /// Iterates registered variable names in lexical order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates `(variable, labels)` pairs in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of registered variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no variable is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of joint assignments over `variables`, saturating on overflow.
    pub fn assignment_count(&self, variables: &[String]) -> Result<usize, ValidationError> {
        variables.iter().try_fold(1usize, |acc, v| {
            Ok(acc.saturating_mul(self.domain(v)?.len()))
        })
    }
}

impl<'de> Deserialize<'de> for DomainRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        DomainRegistry::from_domains(raw).map_err(serde::de::Error::custom)
    }
}

/// A mapping from variable name to one concrete label.
///
/// # Examples
///
/// ```
/// use varelim::Event;
///
/// let event = Event::new().with("A", "1").with("B", "0");
/// assert_eq!(event.get("A"), Some("1"));
/// assert_eq!(event.to_string(), "{A=1, B=0}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(BTreeMap<String, String>);

impl Event {
    /// Creates an empty event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this event with `variable` set to `value`.
    #[must_use]
    pub fn with(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(variable.into(), value.into());
        self
    }

    /// Returns the label assigned to `variable`, if any.
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.0.get(variable).map(String::as_str)
    }

    /// Returns true if `variable` is assigned.
    #[must_use]
    pub fn contains(&self, variable: &str) -> bool {
        self.0.contains_key(variable)
    }

    /// Iterates assigned variable names.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates `(variable, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of assigned variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union of both events; `other` wins where both assign a variable.
    #[must_use]
    pub fn merge(&self, other: &Event) -> Event {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Event(merged)
    }

    /// Builds an event from a scope and one of its assignments.
    #[must_use]
    pub fn from_assignment(scope: &[String], assignment: &[String]) -> Event {
        scope
            .iter()
            .cloned()
            .zip(assignment.iter().cloned())
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Event {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Event(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, "}}")
    }
}

/// Odometer over the cartesian product of some variables' domains.
///
/// The last variable varies fastest. An empty variable list yields exactly
/// one empty assignment.
#[derive(Debug, Clone)]
pub struct Assignments<'a> {
    domains: Vec<&'a [String]>,
    cursor: Vec<usize>,
    done: bool,
}

impl Iterator for Assignments<'_> {
    type Item = Assignment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current: Assignment = self
            .domains
            .iter()
            .zip(&self.cursor)
            .map(|(domain, &i)| domain[i].clone())
            .collect();

        // Advance, carrying leftwards.
        self.done = true;
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.domains[pos].len() {
                self.done = false;
                break;
            }
            self.cursor[pos] = 0;
        }

        Some(current)
    }
}

/// Enumerates every joint assignment of `variables`.
pub fn assignments<'a>(
    variables: &[String],
    domains: &'a DomainRegistry,
) -> Result<Assignments<'a>, ValidationError> {
    let domains: Vec<&'a [String]> = variables
        .iter()
        .map(|v| domains.domain(v))
        .collect::<Result<_, _>>()?;
    let done = domains.iter().any(|d| d.is_empty());
    Ok(Assignments {
        cursor: vec![0; domains.len()],
        domains,
        done,
    })
}

/// Enumerates every joint assignment of `variables` as events.
pub fn events(variables: &[String], domains: &DomainRegistry) -> Result<Vec<Event>, ValidationError> {
    Ok(assignments(variables, domains)?
        .map(|a| Event::from_assignment(variables, &a))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(names: &[&str]) -> DomainRegistry {
        DomainRegistry::from_domains(names.iter().map(|n| (*n, ["0", "1"]))).unwrap()
    }

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn registry_rejects_empty_domain() {
        let err = DomainRegistry::new()
            .with_domain("A", Vec::<String>::new())
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyDomain { variable: "A".to_string() });
    }

    #[test]
    fn registry_rejects_duplicate_labels() {
        let err = DomainRegistry::from_domains([("G", ["xx", "xX", "xx"])]).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateDomainValue { value, .. } if value == "xx"));
    }

    #[test]
    fn registry_unknown_variable() {
        let reg = binary(&["A"]);
        assert!(reg.contains("A"));
        assert!(matches!(reg.domain("B"), Err(ValidationError::UnknownVariable { .. })));
    }

    #[test]
    fn registry_deserialize_validates() {
        let ok: DomainRegistry = serde_json::from_str(r#"{"A": ["0", "1"]}"#).unwrap();
        assert_eq!(ok.get("A").map(<[String]>::len), Some(2));

        let bad = serde_json::from_str::<DomainRegistry>(r#"{"A": ["0", "0"]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn assignment_count_multiplies_domain_sizes() {
        let reg = binary(&["A", "B"])
            .with_domain("G", ["xx", "xX", "XX"])
            .unwrap();
        assert_eq!(reg.assignment_count(&vars(&["A", "B", "G"])).unwrap(), 12);
        assert_eq!(reg.assignment_count(&[]).unwrap(), 1);
    }

    #[test]
    fn assignments_last_variable_fastest() {
        let reg = binary(&["A", "B"]);
        let all: Vec<Assignment> = assignments(&vars(&["A", "B"]), &reg).unwrap().collect();
        assert_eq!(
            all,
            vec![vars(&["0", "0"]), vars(&["0", "1"]), vars(&["1", "0"]), vars(&["1", "1"])]
        );
    }

    #[test]
    fn assignments_of_empty_scope_is_single_empty() {
        let reg = DomainRegistry::new();
        let all: Vec<Assignment> = assignments(&[], &reg).unwrap().collect();
        assert_eq!(all, vec![Vec::<String>::new()]);
    }

    #[test]
    fn events_pair_variables_with_values() {
        let reg = binary(&["A"]);
        let evs = events(&vars(&["A"]), &reg).unwrap();
        assert_eq!(evs, vec![Event::new().with("A", "0"), Event::new().with("A", "1")]);
    }

    #[test]
    fn event_merge_prefers_other() {
        let a = Event::new().with("A", "0").with("B", "0");
        let b = Event::new().with("B", "1").with("C", "1");
        let m = a.merge(&b);
        assert_eq!(m.get("A"), Some("0"));
        assert_eq!(m.get("B"), Some("1"));
        assert_eq!(m.len(), 3);
    }
}
