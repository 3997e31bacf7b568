/// Comparison epsilon used when no options are in scope (canonical-form
/// validation, downstream analysis).
pub(crate) const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Options for the simplex engine.
///
/// Missing options fall back to these defaults; the engine reads nothing
/// else from its environment.
#[derive(Clone, Debug)]
pub struct SolverOptions {
    /// Pivot cap across both phases. Exceeding it yields the
    /// `MaxIterationsReached` status, never `Infeasible` or `Unbounded`.
    pub max_iterations: usize,
    /// Use Bland's lowest-index anti-cycling rule for entering and leaving
    /// choices instead of Dantzig's largest-improvement rule.
    pub blands_rule: bool,
    /// Epsilon for all sign and zero comparisons.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            blands_rule: false,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}
