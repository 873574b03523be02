use crate::error::InferenceError;
use crate::factor::{Factor, Table};

/// Sums `variable` out of `factor`.
///
/// The reduced table is built from the existing entries only: each key
/// loses the eliminated variable's label and its value is added to the
/// bucket of the reduced key. Total mass is preserved.
pub fn sum_out(factor: &Factor, variable: &str) -> Result<Factor, InferenceError> {
    let idx = factor
        .scope()
        .iter()
        .position(|v| v == variable)
        .ok_or_else(|| InferenceError::VariableNotInScope {
            variable: variable.to_string(),
            scope: factor.scope().to_vec(),
        })?;

    let scope: Vec<String> = factor
        .scope()
        .iter()
        .filter(|v| *v != variable)
        .cloned()
        .collect();

    let mut table = Table::new();
    for (key, value) in factor.table() {
        let mut reduced = key.clone();
        reduced.remove(idx);
        *table.entry(reduced).or_insert(0.0) += value;
    }

    Ok(Factor::from_parts(scope, table))
}
