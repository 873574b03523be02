use crate::domain::{assignments, Assignment, DomainRegistry};
use crate::error::{BayesError, BayesResult, InferenceError};
use crate::factor::{Factor, Table};

/// Multiplies factors into one over the union of their scopes.
///
/// The union scope lists each variable once, ordered by first occurrence
/// across `factors`. Every assignment of the union scope maps to the product
/// of each input's value at that assignment projected onto its own scope.
///
/// An empty input yields [`Factor::identity`].
///
/// Cost is the number of union assignments times the number of inputs.
pub fn join<'a, I>(factors: I, domains: &DomainRegistry) -> BayesResult<Factor>
where
    I: IntoIterator<Item = &'a Factor>,
{
    join_bounded(factors, domains, None)
}

/// [`join`] that refuses to enumerate more than `limit` union assignments.
pub(crate) fn join_bounded<'a, I>(
    factors: I,
    domains: &DomainRegistry,
    limit: Option<usize>,
) -> BayesResult<Factor>
where
    I: IntoIterator<Item = &'a Factor>,
{
    let factors: Vec<&Factor> = factors.into_iter().collect();
    if factors.is_empty() {
        return Ok(Factor::identity());
    }

    let mut scope: Vec<String> = Vec::new();
    for factor in &factors {
        for variable in factor.scope() {
            if !scope.contains(variable) {
                scope.push(variable.clone());
            }
        }
    }

    if let Some(limit) = limit {
        let entries = domains.assignment_count(&scope)?;
        if entries > limit {
            return Err(InferenceError::JoinLimitExceeded {
                scope,
                entries,
                limit,
            }
            .into());
        }
    }

    // Positions of each input's scope variables within the union scope.
    let projections: Vec<Vec<usize>> = factors
        .iter()
        .map(|factor| {
            factor
                .scope()
                .iter()
                .map(|v| {
                    scope
                        .iter()
                        .position(|u| u == v)
                        .ok_or_else(|| BayesError::internal(format!("'{v}' missing from union scope")))
                })
                .collect::<BayesResult<Vec<usize>>>()
        })
        .collect::<BayesResult<_>>()?;

    let mut table = Table::new();
    for assignment in assignments(&scope, domains)? {
        let mut product = 1.0;
        for (factor, positions) in factors.iter().zip(&projections) {
            let key: Assignment = positions.iter().map(|&i| assignment[i].clone()).collect();
            product *= factor.value(&key)?;
        }
        table.insert(assignment, product);
    }

    tracing::trace!(
        inputs = factors.len(),
        width = scope.len(),
        entries = table.len(),
        "joined factors"
    );

    Ok(Factor::from_parts(scope, table))
}
