//! Factors and the factor algebra.
//!
//! A [`Factor`] maps every joint assignment of an ordered scope to a
//! non-negative real. Factors are never mutated: [`join`] and [`sum_out`]
//! always return new factors.

mod marginalize;
mod product;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{assignments, Assignment, DomainRegistry, Event};
use crate::error::{InferenceError, ValidationError};

pub use marginalize::sum_out;
pub use product::join;
pub(crate) use product::join_bounded;

/// Factor table keyed by scope-ordered assignments.
pub type Table = BTreeMap<Assignment, f64>;

/// A table over the joint assignments of a fixed, ordered scope.
///
/// # Examples
///
/// ```
/// use varelim::{Event, Factor};
///
/// let f = Factor::new(
///     ["A"],
///     [(vec!["0".to_string()], 0.25), (vec!["1".to_string()], 0.75)],
/// )?;
/// assert_eq!(f.lookup(&Event::new().with("A", "1"))?, 0.75);
/// # Ok::<(), varelim::BayesError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FactorRepr", into = "FactorRepr")]
pub struct Factor {
    scope: Vec<String>,
    table: Table,
}

impl Factor {
    /// Creates a factor from explicit table rows.
    ///
    /// # Validation
    /// - Scope variables must be distinct.
    /// - Every assignment must have one label per scope variable.
    /// - Assignments must not repeat.
    /// - Values must be finite and non-negative.
    ///
    /// Completeness against a domain registry is checked by
    /// [`Factor::validate_against`], which `Network::new` runs.
    pub fn new<S, V, R>(scope: S, rows: R) -> Result<Self, ValidationError>
    where
        S: IntoIterator<Item = V>,
        V: Into<String>,
        R: IntoIterator<Item = (Assignment, f64)>,
    {
        let scope: Vec<String> = scope.into_iter().map(Into::into).collect();
        check_scope(&scope)?;

        let mut table = Table::new();
        for (assignment, value) in rows {
            if assignment.len() != scope.len() {
                return Err(ValidationError::AssignmentArity {
                    expected: scope.len(),
                    actual: assignment.len(),
                    assignment,
                });
            }
            check_value(&assignment, value)?;
            if table.contains_key(&assignment) {
                return Err(ValidationError::DuplicateAssignment { assignment });
            }
            table.insert(assignment, value);
        }

        Ok(Self { scope, table })
    }

    /// Creates a complete factor by evaluating `f` on every assignment of
    /// `scope`, enumerated from `domains`.
    pub fn from_fn<S, V, F>(scope: S, domains: &DomainRegistry, mut f: F) -> Result<Self, ValidationError>
    where
        S: IntoIterator<Item = V>,
        V: Into<String>,
        F: FnMut(&[String]) -> f64,
    {
        let scope: Vec<String> = scope.into_iter().map(Into::into).collect();
        check_scope(&scope)?;

        let mut table = Table::new();
        for assignment in assignments(&scope, domains)? {
            let value = f(&assignment);
            check_value(&assignment, value)?;
            table.insert(assignment, value);
        }

        Ok(Self { scope, table })
    }

    /// The empty-scope factor whose single entry is 1.0.
    #[must_use]
    pub fn identity() -> Self {
        let mut table = Table::new();
        table.insert(Vec::new(), 1.0);
        Self {
            scope: Vec::new(),
            table,
        }
    }

    pub(crate) fn from_parts(scope: Vec<String>, table: Table) -> Self {
        Self { scope, table }
    }

    /// The ordered scope.
    #[must_use]
    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Returns true if `variable` is in the scope.
    #[must_use]
    pub fn contains(&self, variable: &str) -> bool {
        self.scope.iter().any(|v| v == variable)
    }

    /// Number of table entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Sum of all table values.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.table.values().sum()
    }

    /// Iterates `(event, value)` pairs in table order.
    pub fn events(&self) -> impl Iterator<Item = (Event, f64)> + '_ {
        self.table
            .iter()
            .map(|(key, &value)| (Event::from_assignment(&self.scope, key), value))
    }

    /// Looks up the value of `event` projected onto this factor's scope.
    ///
    /// Variables of `event` outside the scope are ignored.
    ///
    /// # Errors
    /// - `MissingVariable` if `event` does not assign a scope variable.
    /// - `KeyNotFound` if the projected key is not in the table.
    pub fn lookup(&self, event: &Event) -> Result<f64, InferenceError> {
        let key = self
            .scope
            .iter()
            .map(|var| {
                event
                    .get(var)
                    .map(str::to_string)
                    .ok_or_else(|| InferenceError::MissingVariable {
                        variable: var.clone(),
                    })
            })
            .collect::<Result<Assignment, _>>()?;
        self.value(&key)
    }

    /// Looks up a scope-ordered key directly.
    pub fn value(&self, key: &[String]) -> Result<f64, InferenceError> {
        self.table
            .get(key)
            .copied()
            .ok_or_else(|| InferenceError::KeyNotFound {
                scope: self.scope.clone(),
                key: key.to_vec(),
            })
    }

    /// Checks that every scope variable is registered, every label is legal,
    /// and every combination of labels is present.
    pub fn validate_against(&self, domains: &DomainRegistry) -> Result<(), ValidationError> {
        let scope_domains: Vec<&[String]> = self
            .scope
            .iter()
            .map(|v| domains.domain(v))
            .collect::<Result<_, _>>()?;

        for key in self.table.keys() {
            for ((variable, domain), label) in self.scope.iter().zip(&scope_domains).zip(key) {
                if !domain.contains(label) {
                    return Err(ValidationError::ValueOutOfDomain {
                        variable: variable.clone(),
                        value: label.clone(),
                    });
                }
            }
        }

        // Keys are distinct and legal, so matching the count means complete.
        let expected = domains.assignment_count(&self.scope)?;
        if self.table.len() != expected {
            return Err(ValidationError::IncompleteTable {
                scope: self.scope.clone(),
                expected,
                actual: self.table.len(),
            });
        }
        Ok(())
    }
}

fn check_scope(scope: &[String]) -> Result<(), ValidationError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(scope.len());
    for variable in scope {
        if !seen.insert(variable.as_str()) {
            return Err(ValidationError::DuplicateScopeVariable {
                variable: variable.clone(),
            });
        }
    }
    Ok(())
}

fn check_value(assignment: &[String], value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidFactorValue {
            assignment: assignment.to_vec(),
            value,
        });
    }
    Ok(())
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]:", self.scope.join(", "))?;
        for (key, value) in &self.table {
            write!(f, "\n  ({}): {value}", key.join(", "))?;
        }
        Ok(())
    }
}

/// Wire form of a factor: JSON object keys cannot be tuples.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FactorRepr {
    scope: Vec<String>,
    rows: Vec<FactorRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FactorRow {
    assignment: Assignment,
    value: f64,
}

impl TryFrom<FactorRepr> for Factor {
    type Error = ValidationError;

    fn try_from(repr: FactorRepr) -> Result<Self, Self::Error> {
        Factor::new(
            repr.scope,
            repr.rows.into_iter().map(|row| (row.assignment, row.value)),
        )
    }
}

impl From<Factor> for FactorRepr {
    fn from(factor: Factor) -> Self {
        Self {
            scope: factor.scope,
            rows: factor
                .table
                .into_iter()
                .map(|(assignment, value)| FactorRow { assignment, value })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(labels: &[&str]) -> Assignment {
        labels.iter().map(|s| (*s).to_string()).collect()
    }

    fn ab_factor() -> Factor {
        Factor::new(
            ["A", "B"],
            [
                (key(&["0", "0"]), 0.1),
                (key(&["0", "1"]), 0.2),
                (key(&["1", "0"]), 0.3),
                (key(&["1", "1"]), 0.4),
            ],
        )
        .unwrap()
    }

    #[test]
    fn lookup_projects_event_onto_scope() {
        let f = ab_factor();
        let event = Event::new().with("B", "1").with("A", "1").with("C", "7");
        assert!((f.lookup(&event).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn lookup_missing_variable() {
        let f = ab_factor();
        let err = f.lookup(&Event::new().with("A", "0")).unwrap_err();
        assert_eq!(err, InferenceError::MissingVariable { variable: "B".to_string() });
    }

    #[test]
    fn lookup_key_not_found() {
        let f = ab_factor();
        let err = f.lookup(&Event::new().with("A", "0").with("B", "2")).unwrap_err();
        assert!(matches!(err, InferenceError::KeyNotFound { key, .. } if key == vec!["0", "2"]));
    }

    #[test]
    fn new_rejects_duplicate_scope_variable() {
        let err = Factor::new(["A", "A"], Vec::new()).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateScopeVariable { .. }));
    }

    #[test]
    fn new_rejects_wrong_arity_and_negative_values() {
        let err = Factor::new(["A"], [(key(&["0", "1"]), 0.5)]).unwrap_err();
        assert!(matches!(err, ValidationError::AssignmentArity { expected: 1, actual: 2, .. }));

        let err = Factor::new(["A"], [(key(&["0"]), -0.5)]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFactorValue { .. }));

        let err = Factor::new(["A"], [(key(&["0"]), f64::NAN)]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFactorValue { .. }));
    }

    #[test]
    fn new_rejects_duplicate_rows() {
        let err = Factor::new(["A"], [(key(&["0"]), 0.5), (key(&["0"]), 0.5)]).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateAssignment { .. }));
    }

    #[test]
    fn validate_against_detects_incomplete_and_illegal_tables() {
        let domains = DomainRegistry::from_domains([("A", ["0", "1"])]).unwrap();

        let partial = Factor::new(["A"], [(key(&["0"]), 1.0)]).unwrap();
        assert!(matches!(
            partial.validate_against(&domains),
            Err(ValidationError::IncompleteTable { expected: 2, actual: 1, .. })
        ));

        let illegal = Factor::new(["A"], [(key(&["0"]), 0.5), (key(&["9"]), 0.5)]).unwrap();
        assert!(matches!(
            illegal.validate_against(&domains),
            Err(ValidationError::ValueOutOfDomain { .. })
        ));

        let unknown = Factor::new(["Z"], [(key(&["0"]), 1.0)]).unwrap();
        assert!(matches!(
            unknown.validate_against(&domains),
            Err(ValidationError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn from_fn_covers_every_assignment() {
        let domains = DomainRegistry::from_domains([("A", ["0", "1"]), ("B", ["0", "1"])]).unwrap();
        let f = Factor::from_fn(["A", "B"], &domains, |a| if a[0] == a[1] { 1.0 } else { 0.0 }).unwrap();
        assert_eq!(f.len(), 4);
        assert!((f.total() - 2.0).abs() < 1e-12);
        f.validate_against(&domains).unwrap();
    }

    #[test]
    fn identity_has_single_unit_entry() {
        let id = Factor::identity();
        assert!(id.scope().is_empty());
        assert_eq!(id.lookup(&Event::new()).unwrap(), 1.0);
    }

    #[test]
    fn display_lists_scope_and_rows() {
        let f = Factor::new(["A"], [(key(&["0"]), 0.5), (key(&["1"]), 0.5)]).unwrap();
        assert_eq!(f.to_string(), "[A]:\n  (0): 0.5\n  (1): 0.5");
    }

    #[test]
    fn serde_validates_rows() {
        let json = r#"{"scope":["A"],"rows":[{"assignment":["0"],"value":-1.0}]}"#;
        assert!(serde_json::from_str::<Factor>(json).is_err());

        let f = ab_factor();
        let back: Factor = serde_json::from_str(&serde_json::to_string(&f).unwrap()).unwrap();
        assert_eq!(back, f);
    }
}
