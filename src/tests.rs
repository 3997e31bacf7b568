#[cfg(test)]
mod tests {
    use crate::analysis::duality::check_strong_duality;
    use crate::analysis::sensitivity::{cost_ranges, rhs_ranges, shadow_prices};
    use crate::model::{Constraint, Model, ObjectiveSense, Relation, Variable};
    use crate::solver::engine::solve;
    use crate::solver::options::SolverOptions;
    use crate::solver::result::SolveStatus;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn production_model() -> Model {
        // maximize 2 x1 + 3 x2, x1 + x2 <= 4, x1 <= 2
        let mut model = Model::new(ObjectiveSense::Maximize);
        model.add_variable(Variable::positive("x1", 2.0));
        model.add_variable(Variable::positive("x2", 3.0));
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessEqual, 4.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessEqual, 2.0));
        model
    }

    #[test]
    #[ntest::timeout(2000)]
    fn solve_analyse_and_check_duality_end_to_end() {
        init();
        let model = production_model();
        let options = SolverOptions::default();
        let result = solve(&model, &options).unwrap();

        assert_eq!(result.status, SolveStatus::Optimal);
        assert!((result.objective - 12.0).abs() < 1e-6);

        let prices = shadow_prices(&result).unwrap();
        assert!((prices[0] - 3.0).abs() < 1e-6);
        assert!(prices[1].abs() < 1e-6);

        let report = check_strong_duality(&model, &result, &options)
            .unwrap()
            .unwrap();
        assert!(report.explicit_dual);
        assert!(report.strong_duality);

        let costs = cost_ranges(&model, &result).unwrap();
        let rhs = rhs_ranges(&model, &result).unwrap();
        assert!(!costs.is_empty());
        assert_eq!(rhs.len(), model.num_constraints());
    }

    #[test]
    #[ntest::timeout(2000)]
    fn shadow_price_predicts_objective_change() {
        init();
        let options = SolverOptions::default();
        let model = production_model();
        let result = solve(&model, &options).unwrap();
        let prices = shadow_prices(&result).unwrap();
        let ranges = rhs_ranges(&model, &result).unwrap();

        // nudge the binding row within its allowable increase; the objective
        // must move by the shadow price times the nudge
        let delta = 1.0;
        assert!(ranges[0].range.allowable_increase >= delta);
        let mut nudged = model.clone();
        nudged.constraints[0].rhs += delta;
        let renudged = solve(&nudged, &options).unwrap();
        assert!(renudged.is_optimal());
        assert!((renudged.objective - (result.objective + prices[0] * delta)).abs() < 1e-6);
    }

    #[test]
    #[ntest::timeout(2000)]
    fn cost_change_within_range_keeps_the_optimum() {
        init();
        let options = SolverOptions::default();
        let model = production_model();
        let result = solve(&model, &options).unwrap();
        let ranges = cost_ranges(&model, &result).unwrap();

        // x1 is nonbasic with allowable increase 1; raising its coefficient
        // by half of that must leave the optimal point untouched
        let x1 = ranges.iter().find(|r| r.variable == Some(0)).unwrap();
        assert!(!x1.basic);
        let delta = x1.range.allowable_increase / 2.0;
        let mut nudged = model.clone();
        nudged.variables[0].objective_coefficient += delta;
        let renudged = solve(&nudged, &options).unwrap();
        assert!(renudged.is_optimal());
        for (a, b) in renudged.values.iter().zip(result.values.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    #[ntest::timeout(2000)]
    fn canary_statuses() {
        init();
        let options = SolverOptions::default();

        let mut unbounded = Model::new(ObjectiveSense::Maximize);
        unbounded.add_variable(Variable::positive("x1", 1.0));
        unbounded.add_variable(Variable::positive("x2", 0.0));
        unbounded.add_constraint(Constraint::new(vec![1.0, -1.0], Relation::LessEqual, 1.0));
        assert_eq!(
            solve(&unbounded, &options).unwrap().status,
            SolveStatus::Unbounded
        );

        let mut infeasible = Model::new(ObjectiveSense::Minimize);
        infeasible.add_variable(Variable::positive("x1", 1.0));
        infeasible.add_constraint(Constraint::new(vec![1.0], Relation::LessEqual, 1.0));
        infeasible.add_constraint(Constraint::new(vec![1.0], Relation::GreaterEqual, 3.0));
        assert_eq!(
            solve(&infeasible, &options).unwrap().status,
            SolveStatus::Infeasible
        );

        let capped = SolverOptions {
            max_iterations: 0,
            ..SolverOptions::default()
        };
        assert_eq!(
            solve(&production_model(), &capped).unwrap().status,
            SolveStatus::MaxIterationsReached
        );
    }

    #[test]
    #[ntest::timeout(2000)]
    fn blands_rule_agrees_with_dantzig_across_models() {
        init();
        let dantzig = SolverOptions::default();
        let bland = SolverOptions {
            blands_rule: true,
            ..SolverOptions::default()
        };

        let mut models = vec![production_model()];

        let mut degenerate = Model::new(ObjectiveSense::Maximize);
        degenerate.add_variable(Variable::positive("x1", 1.0));
        degenerate.add_variable(Variable::positive("x2", 1.0));
        degenerate.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessEqual, 2.0));
        degenerate.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessEqual, 2.0));
        models.push(degenerate);

        let mut mixed = Model::new(ObjectiveSense::Minimize);
        mixed.add_variable(Variable::positive("x1", 3.0));
        mixed.add_variable(Variable::positive("x2", 2.0));
        mixed.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::GreaterEqual, 4.0));
        mixed.add_constraint(Constraint::new(vec![2.0, 1.0], Relation::LessEqual, 10.0));
        models.push(mixed);

        for model in models {
            let a = solve(&model, &dantzig).unwrap();
            let b = solve(&model, &bland).unwrap();
            assert!(a.is_optimal());
            assert!(b.is_optimal());
            assert!((a.objective - b.objective).abs() < 1e-9);
        }
    }

    #[test]
    #[ntest::timeout(2000)]
    fn optimal_solutions_satisfy_their_constraints() {
        init();
        let options = SolverOptions::default();
        let mut free_and_negative = Model::new(ObjectiveSense::Minimize);
        free_and_negative.add_variable(Variable::unrestricted("u", 1.0));
        free_and_negative.add_variable(Variable::negative("n", -1.0));
        free_and_negative.add_constraint(Constraint::new(
            vec![1.0, 1.0],
            Relation::GreaterEqual,
            -5.0,
        ));
        free_and_negative.add_constraint(Constraint::new(vec![0.0, 1.0], Relation::GreaterEqual, -2.0));

        for model in [production_model(), free_and_negative] {
            let result = solve(&model, &options).unwrap();
            assert!(result.is_optimal());
            for constraint in &model.constraints {
                let lhs: f64 = constraint
                    .coefficients
                    .iter()
                    .zip(&result.values)
                    .map(|(a, x)| a * x)
                    .sum();
                match constraint.relation {
                    Relation::LessEqual => assert!(lhs <= constraint.rhs + 1e-6),
                    Relation::GreaterEqual => assert!(lhs >= constraint.rhs - 1e-6),
                    Relation::Equal => assert!((lhs - constraint.rhs).abs() < 1e-6),
                }
            }
        }
    }

    #[test]
    #[ntest::timeout(2000)]
    fn alternate_optima_are_flagged_but_still_optimal() {
        init();
        let mut model = Model::new(ObjectiveSense::Maximize);
        model.add_variable(Variable::positive("x1", 1.0));
        model.add_variable(Variable::positive("x2", 1.0));
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessEqual, 2.0));

        let result = solve(&model, &SolverOptions::default()).unwrap();
        assert_eq!(result.status, SolveStatus::AlternativeOptimal);
        assert!(result.is_optimal());
        assert!((result.objective - 2.0).abs() < 1e-6);
    }

    #[test]
    #[ntest::timeout(2000)]
    fn model_survives_serialization_before_solving() {
        init();
        let model = production_model();
        let json = serde_json::to_string(&model).unwrap();
        let restored: Model = serde_json::from_str(&json).unwrap();
        let options = SolverOptions::default();
        let a = solve(&model, &options).unwrap();
        let b = solve(&restored, &options).unwrap();
        assert_eq!(a.status, b.status);
        assert!((a.objective - b.objective).abs() < 1e-12);
    }
}
