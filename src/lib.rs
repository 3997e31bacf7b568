/*!
A dense two-phase revised simplex solver for linear programs.

A [`model::Model`] declares an objective sense, typed variables and linear
constraints. [`solver::engine::solve`] canonicalizes it to standard form,
runs Phase I/Phase II revised simplex over a dense basis inverse and maps
the optimum back to the original variables, exporting the basis, reduced
costs and dual values for the [`analysis`] layer (shadow prices, cost and
right-hand-side ranging, strong duality checks).

```
use denselp::model::{Constraint, Model, ObjectiveSense, Relation, Variable};
use denselp::solver::engine::solve;
use denselp::solver::options::SolverOptions;

let mut model = Model::new(ObjectiveSense::Maximize);
model.add_variable(Variable::positive("x1", 2.0));
model.add_variable(Variable::positive("x2", 3.0));
model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessEqual, 4.0));
model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessEqual, 2.0));

let result = solve(&model, &SolverOptions::default()).unwrap();
assert!(result.is_optimal());
assert!((result.objective - 12.0).abs() < 1e-6);
```
*/

pub mod analysis {
    pub mod duality;
    pub mod sensitivity;
}
pub mod canonical {
    pub mod canonical_form;
    pub mod canonicalizer;
    pub mod variable_mapping;
}
pub mod math {
    pub mod matrix;
}
pub mod model;
pub mod solver {
    pub mod basis;
    pub mod engine;
    pub mod options;
    pub mod result;
}
pub mod tests;
