use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// The outcome of a solve call.
///
/// `Optimal` and `AlternativeOptimal` both mean an optimum was reached;
/// the latter signals that some nonbasic column has a zero reduced cost,
/// so other vertices attain the same objective value.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    AlternativeOptimal,
    /// Phase I could not drive the artificial variables to zero.
    Infeasible,
    /// The ratio test found no eligible leaving row.
    Unbounded,
    /// The pivot cap was hit before reaching optimality.
    MaxIterationsReached,
    /// A structural failure: singular basis matrix, or no initial basis
    /// could be constructed. Details are in the diagnostic log.
    Error,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::AlternativeOptimal)
    }
}

/// The artifacts exported by the engine at an optimum, consumed by the
/// sensitivity/duality layer and by search drivers (branch & bound, cutting
/// planes). Present only on `Optimal`/`AlternativeOptimal`.
#[derive(Clone)]
pub struct Artifacts {
    /// Canonical column index of the basic variable of each row.
    pub basis: Vec<usize>,
    /// Inverse of the final basis matrix.
    pub basis_inverse: Array2<f64>,
    /// Reduced cost of every canonical column.
    pub reduced_costs: Array1<f64>,
    /// Dual value per constraint, in the original constraint orientation.
    pub duals: Array1<f64>,
    /// Whether some nonbasic column has a reduced cost within tolerance of
    /// zero.
    pub alternate_optima: bool,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only printing lengths here because actual data is probably huge.
        f.debug_struct("Artifacts")
            .field("num_rows", &self.basis.len())
            .field("num_columns", &self.reduced_costs.len())
            .field("alternate_optima", &self.alternate_optima)
            .finish()
    }
}

/// The result of a solve call in canonical column space, before mapping
/// back to original variables. The duality layer consumes this directly.
#[derive(Clone, Debug)]
pub struct CanonicalOutcome {
    pub status: SolveStatus,
    pub objective: f64,
    pub canonical_values: Array1<f64>,
    pub iterations: usize,
    pub log: String,
    pub artifacts: Option<Artifacts>,
}

impl CanonicalOutcome {
    pub(crate) fn failed(
        status: SolveStatus,
        iterations: usize,
        log: String,
        num_columns: usize,
    ) -> Self {
        Self {
            status,
            objective: 0.0,
            canonical_values: Array1::zeros(num_columns),
            iterations,
            log,
            artifacts: None,
        }
    }
}

/// The result of a solve call: status, objective value in the caller's
/// declared sense, variable values in original variable space, and the
/// artifact set when an optimum was reached.
#[derive(Clone, Debug)]
pub struct SolutionResult {
    pub status: SolveStatus,
    pub objective: f64,
    /// One value per original variable; all zero unless the status is
    /// optimal.
    pub values: Vec<f64>,
    /// Pivots performed across both phases.
    pub iterations: usize,
    /// Free-form diagnostic text for audit and debugging; not a structured
    /// interface.
    pub log: String,
    pub artifacts: Option<Artifacts>,
}

impl SolutionResult {
    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }
}
