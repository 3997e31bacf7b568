use itertools::izip;
use ndarray::{Array1, Array2};

use crate::canonical::variable_mapping::VariableMapping;
use crate::model::{ModelError, ObjectiveSense};

/// The domain of a canonical column. Structural columns inherit integrality
/// from their original variable; everything else is continuous and >= 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Continuous,
    Integer,
    Binary,
}

/// A model in standard form: optimize `objective . x` subject to
/// `matrix . x = rhs`, `x >= 0`, with `rhs >= 0` after row-sign
/// normalization.
///
/// Built fresh per solve call and never mutated afterwards; drivers that
/// tighten bounds or add cuts rebuild it from a modified model.
#[derive(Clone, Debug)]
pub struct CanonicalForm {
    pub sense: ObjectiveSense,
    /// Objective in canonical column space, in the caller's original sense.
    pub objective: Array1<f64>,
    /// Constraint rows over all canonical columns.
    pub matrix: Array2<f64>,
    /// Right-hand side, >= 0 for every row.
    pub rhs: Array1<f64>,
    /// Per-column lower bounds, all >= 0.
    pub lower: Vec<f64>,
    /// Per-column upper bounds; carried for bound-tightening drivers, the
    /// engine itself only enforces x >= 0.
    pub upper: Vec<f64>,
    pub column_types: Vec<ColumnType>,
    pub mapping: VariableMapping,
    /// Canonical indices of the artificial columns.
    pub artificials: Vec<usize>,
    /// The factor (+1 or -1) each original row was multiplied by during
    /// normalization; applied again when exporting duals and RHS ranges.
    pub row_signs: Vec<f64>,
    pub requires_phase_one: bool,
}

impl CanonicalForm {
    pub fn num_rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn num_columns(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn is_artificial(&self, column: usize) -> bool {
        self.mapping.is_artificial(column)
    }

    /// Check the invariants promised to the engine: matching dimensions,
    /// finite data, non-negative right-hand side and consistent bounds.
    pub(crate) fn validate(&self, tolerance: f64) -> Result<(), ModelError> {
        let (m, n) = (self.num_rows(), self.num_columns());
        if self.objective.len() != n
            || self.rhs.len() != m
            || self.lower.len() != n
            || self.upper.len() != n
            || self.column_types.len() != n
            || self.row_signs.len() != m
            || self.mapping.num_columns() != n
        {
            return Err(ModelError::Internal(
                "canonical form dimensions do not match declared counts".to_string(),
            ));
        }
        if self.objective.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::NonFiniteData {
                place: "canonical objective".to_string(),
            });
        }
        for (r, b) in self.rhs.iter().enumerate() {
            if !b.is_finite() || *b < -tolerance {
                return Err(ModelError::NonFiniteData {
                    place: format!("canonical right-hand side of row {}", r),
                });
            }
        }
        for (column, (low, high)) in izip!(&self.lower, &self.upper).enumerate() {
            if low > high {
                return Err(ModelError::InconsistentBounds { variable: column });
            }
        }
        Ok(())
    }
}
