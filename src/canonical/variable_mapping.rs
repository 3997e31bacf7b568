use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// The kind of a non-structural (auxiliary) canonical column.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuxiliaryKind {
    /// Added with coefficient +1 to turn a <= row into an equality.
    Slack,
    /// Added with coefficient -1 to turn a >= row into an equality.
    Surplus,
    /// Added with coefficient +1 to give = and >= rows a starting basis;
    /// must be driven to zero in Phase I.
    Artificial,
}

/// The provenance of a single canonical column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnOrigin {
    /// Derived from an original variable; `sign` is the factor applied when
    /// contracting a canonical solution back to original space.
    Structural { variable: usize, sign: f64 },
    /// An auxiliary column owned by one constraint row.
    Auxiliary { kind: AuxiliaryKind, row: usize },
}

/// The signed map between original variables and canonical columns.
///
/// Each original variable maps to an ordered list of (column, sign) pairs:
/// one (+1) pair for most types, one (-1) pair for `Negative` variables
/// (substitution x = -y) and two (+1, -1) pairs for `Unrestricted` variables
/// (split x = x+ - x-). Column indices are assigned densely in variable scan
/// order; every downstream reader relies on that ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableMapping {
    forward: Vec<Vec<(usize, f64)>>,
    columns: Vec<ColumnOrigin>,
}

impl VariableMapping {
    pub(crate) fn with_capacity(num_variables: usize) -> Self {
        Self {
            forward: Vec::with_capacity(num_variables),
            columns: vec![],
        }
    }

    /// Register the columns of the next original variable and return the
    /// assigned canonical column indices.
    pub(crate) fn push_variable(&mut self, signs: &[f64]) -> Vec<usize> {
        let variable = self.forward.len();
        let mut pairs = Vec::with_capacity(signs.len());
        let mut assigned = Vec::with_capacity(signs.len());
        for &sign in signs {
            let column = self.columns.len();
            self.columns.push(ColumnOrigin::Structural { variable, sign });
            pairs.push((column, sign));
            assigned.push(column);
        }
        self.forward.push(pairs);
        assigned
    }

    /// Register an auxiliary column owned by `row` and return its index.
    pub(crate) fn push_auxiliary(&mut self, kind: AuxiliaryKind, row: usize) -> usize {
        let column = self.columns.len();
        self.columns.push(ColumnOrigin::Auxiliary { kind, row });
        column
    }

    /// The (column, sign) pairs of an original variable.
    pub fn pairs(&self, variable: usize) -> &[(usize, f64)] {
        &self.forward[variable]
    }

    /// The provenance of a canonical column.
    pub fn origin(&self, column: usize) -> &ColumnOrigin {
        &self.columns[column]
    }

    /// The original variable a structural column derives from.
    pub fn original_variable(&self, column: usize) -> Option<usize> {
        match self.columns[column] {
            ColumnOrigin::Structural { variable, .. } => Some(variable),
            ColumnOrigin::Auxiliary { .. } => None,
        }
    }

    pub fn is_structural(&self, column: usize) -> bool {
        matches!(self.columns[column], ColumnOrigin::Structural { .. })
    }

    pub fn is_artificial(&self, column: usize) -> bool {
        matches!(
            self.columns[column],
            ColumnOrigin::Auxiliary {
                kind: AuxiliaryKind::Artificial,
                ..
            }
        )
    }

    pub fn num_variables(&self) -> usize {
        self.forward.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Expand an original-space coefficient row into canonical column space:
    /// `canonical[column] += sign * original[variable]` for every pair.
    /// Auxiliary columns are left at zero.
    pub fn expand_row(&self, original: &[f64], width: usize) -> Vec<f64> {
        debug_assert_eq!(original.len(), self.forward.len());
        let mut expanded = vec![0.0; width];
        for (variable, pairs) in self.forward.iter().enumerate() {
            for &(column, sign) in pairs {
                expanded[column] += sign * original[variable];
            }
        }
        expanded
    }

    /// Contract a canonical solution back to original variable space:
    /// `x[variable] = sum(sign * canonical[column])` over its pairs.
    pub fn to_original(&self, canonical: &[f64]) -> Vec<f64> {
        let mut values = vec![0.0; self.forward.len()];
        for (variable, pairs) in self.forward.iter().enumerate() {
            for &(column, sign) in pairs {
                values[variable] += sign * canonical[column];
            }
        }
        values
    }
}
