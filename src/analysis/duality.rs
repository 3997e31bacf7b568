use log::debug;

use crate::model::{Constraint, Model, ModelError, ObjectiveSense, Relation, Variable, VariableType};
use crate::solver::engine::solve;
use crate::solver::options::SolverOptions;
use crate::solver::result::SolutionResult;

/// Objective gap above which the strong duality check fails.
const DUALITY_TOLERANCE: f64 = 1e-6;

/// The outcome of a strong duality check on an optimal primal result.
#[derive(Clone, Debug)]
pub struct DualityReport {
    pub primal_objective: f64,
    pub dual_objective: f64,
    /// Absolute difference between the two objective values.
    pub gap: f64,
    pub strong_duality: bool,
    /// Whether the dual objective came from solving an explicitly built
    /// dual model rather than from the exported dual values.
    pub explicit_dual: bool,
}

/// Whether the model is in the standard maximization form (maximize, all
/// rows <=, all variables non-negative) for which an explicit dual is
/// constructed.
pub fn is_standard_max_form(model: &Model) -> bool {
    model.sense == ObjectiveSense::Maximize
        && model
            .constraints
            .iter()
            .all(|constraint| constraint.relation == Relation::LessEqual)
        && model.variables.iter().all(|variable| {
            matches!(
                variable.variable_type,
                VariableType::Positive | VariableType::Continuous
            )
        })
}

/// Build the dual of a standard-form maximization model: minimize `b . y`
/// subject to `A^T y >= c`, `y >= 0`, one dual variable per primal row.
pub fn build_dual(model: &Model) -> Result<Model, ModelError> {
    if !is_standard_max_form(model) {
        return Err(ModelError::NotInStandardForm);
    }

    let mut dual = Model::new(ObjectiveSense::Minimize);
    for (row, constraint) in model.constraints.iter().enumerate() {
        dual.add_variable(Variable::positive(format!("y{}", row), constraint.rhs));
    }
    for (column, variable) in model.variables.iter().enumerate() {
        let coefficients = model
            .constraints
            .iter()
            .map(|constraint| constraint.coefficients[column])
            .collect();
        dual.add_constraint(Constraint::new(
            coefficients,
            Relation::GreaterEqual,
            variable.objective_coefficient,
        ));
    }
    debug!(
        "built dual: {} variables, {} constraints",
        dual.num_variables(),
        dual.num_constraints(),
    );
    Ok(dual)
}

/// Check strong duality on an optimal primal result.
///
/// Standard-form maximization models get an explicitly constructed dual,
/// solved with the same engine; the primal and dual optima must agree. For
/// every other shape the check compares the primal objective against
/// `b . pi` over the exported dual values, which equals the objective at
/// any simplex optimum. Returns `None` when the primal result carries no
/// optimum to check against.
pub fn check_strong_duality(
    model: &Model,
    result: &SolutionResult,
    options: &SolverOptions,
) -> Result<Option<DualityReport>, ModelError> {
    if !result.is_optimal() {
        return Ok(None);
    }

    let (dual_objective, explicit_dual) = if is_standard_max_form(model) {
        let dual = build_dual(model)?;
        let dual_result = solve(&dual, options)?;
        if !dual_result.is_optimal() {
            debug!("dual solve ended with status {}", dual_result.status);
            return Ok(Some(DualityReport {
                primal_objective: result.objective,
                dual_objective: f64::NAN,
                gap: f64::INFINITY,
                strong_duality: false,
                explicit_dual: true,
            }));
        }
        (dual_result.objective, true)
    } else {
        let artifacts = result.artifacts.as_ref().ok_or_else(|| {
            ModelError::Internal("optimal result without artifacts".to_string())
        })?;
        let objective = model
            .constraints
            .iter()
            .zip(artifacts.duals.iter())
            .map(|(constraint, dual)| constraint.rhs * dual)
            .sum();
        (objective, false)
    };

    let gap = (result.objective - dual_objective).abs();
    debug!(
        "duality gap {} (explicit dual: {})",
        gap, explicit_dual,
    );
    Ok(Some(DualityReport {
        primal_objective: result.objective,
        dual_objective,
        gap,
        strong_duality: gap <= DUALITY_TOLERANCE,
        explicit_dual,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_model() -> Model {
        // maximize 2 x1 + 3 x2, x1 + x2 <= 4, x1 <= 2
        let mut model = Model::new(ObjectiveSense::Maximize);
        model.add_variable(Variable::positive("x1", 2.0));
        model.add_variable(Variable::positive("x2", 3.0));
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessEqual, 4.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessEqual, 2.0));
        model
    }

    #[test]
    fn standard_form_detection() {
        assert!(is_standard_max_form(&standard_model()));

        let mut minimization = standard_model();
        minimization.sense = ObjectiveSense::Minimize;
        assert!(!is_standard_max_form(&minimization));

        let mut with_equality = standard_model();
        with_equality.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::Equal, 3.0));
        assert!(!is_standard_max_form(&with_equality));

        let mut with_free = standard_model();
        with_free.add_variable(Variable::unrestricted("x3", 1.0));
        assert!(!is_standard_max_form(&with_free));
    }

    #[test]
    fn dual_transposes_the_model() {
        let dual = build_dual(&standard_model()).unwrap();
        assert_eq!(dual.sense, ObjectiveSense::Minimize);
        assert_eq!(dual.num_variables(), 2);
        assert_eq!(dual.num_constraints(), 2);
        // dual objective is the primal rhs
        assert_eq!(dual.variables[0].objective_coefficient, 4.0);
        assert_eq!(dual.variables[1].objective_coefficient, 2.0);
        // dual rows are primal columns with >= and the primal costs as rhs
        assert_eq!(dual.constraints[0].coefficients, vec![1.0, 1.0]);
        assert_eq!(dual.constraints[0].relation, Relation::GreaterEqual);
        assert_eq!(dual.constraints[0].rhs, 2.0);
        assert_eq!(dual.constraints[1].coefficients, vec![1.0, 0.0]);
        assert_eq!(dual.constraints[1].rhs, 3.0);
    }

    #[test]
    fn dual_of_non_standard_form_is_rejected() {
        let mut model = standard_model();
        model.sense = ObjectiveSense::Minimize;
        assert!(matches!(
            build_dual(&model),
            Err(ModelError::NotInStandardForm)
        ));
    }

    #[test]
    #[ntest::timeout(1000)]
    fn strong_duality_via_explicit_dual() {
        let model = standard_model();
        let options = SolverOptions::default();
        let result = solve(&model, &options).unwrap();
        let report = check_strong_duality(&model, &result, &options)
            .unwrap()
            .unwrap();
        assert!(report.explicit_dual);
        assert!(report.strong_duality);
        assert!((report.primal_objective - 12.0).abs() < 1e-6);
        assert!((report.dual_objective - 12.0).abs() < 1e-6);
    }

    #[test]
    #[ntest::timeout(1000)]
    fn strong_duality_via_exported_duals() {
        // a minimization with a >= row is not standard form, so the check
        // falls back to b . pi
        let mut model = Model::new(ObjectiveSense::Minimize);
        model.add_variable(Variable::positive("x1", 3.0));
        model.add_variable(Variable::positive("x2", 2.0));
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::GreaterEqual, 4.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessEqual, 3.0));

        let options = SolverOptions::default();
        let result = solve(&model, &options).unwrap();
        let report = check_strong_duality(&model, &result, &options)
            .unwrap()
            .unwrap();
        assert!(!report.explicit_dual);
        assert!(report.strong_duality);
        assert!((report.primal_objective - 8.0).abs() < 1e-6);
    }

    #[test]
    #[ntest::timeout(1000)]
    fn no_report_without_an_optimum() {
        let mut model = Model::new(ObjectiveSense::Maximize);
        model.add_variable(Variable::positive("x1", 1.0));
        let options = SolverOptions::default();
        let result = solve(&model, &options).unwrap();
        assert!(!result.is_optimal());
        assert!(check_strong_duality(&model, &result, &options)
            .unwrap()
            .is_none());
    }
}
