use std::fmt::Write as _;

use log::debug;
use ndarray::{Array1, Array2};

use crate::canonical::canonical_form::CanonicalForm;
use crate::canonical::canonicalizer::canonicalize;
use crate::model::{Model, ModelError, ObjectiveSense};
use crate::solver::basis::{initial_basis, invert_basis};
use crate::solver::options::SolverOptions;
use crate::solver::result::{Artifacts, CanonicalOutcome, SolutionResult, SolveStatus};

/// A Phase I objective above this threshold means some artificial variable
/// could not be driven to zero, i.e. the model is infeasible.
const PHASE_ONE_FEASIBILITY_TOLERANCE: f64 = 1e-8;

/// Solve a model: validate, canonicalize, run the two-phase revised simplex
/// and map the canonical solution back to original variable space.
///
/// Only pre-solve validation surfaces as an error. Every solve-time outcome
/// (infeasibility, unboundedness, the iteration cap, singular bases) is a
/// status on the returned result.
///
/// ```
/// use denselp::model::{Constraint, Model, ObjectiveSense, Relation, Variable};
/// use denselp::solver::engine::solve;
/// use denselp::solver::options::SolverOptions;
///
/// // maximize 2 x1 + 3 x2 subject to x1 + x2 <= 4 and x1 <= 2
/// let mut model = Model::new(ObjectiveSense::Maximize);
/// model.add_variable(Variable::positive("x1", 2.0));
/// model.add_variable(Variable::positive("x2", 3.0));
/// model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessEqual, 4.0));
/// model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessEqual, 2.0));
///
/// let result = solve(&model, &SolverOptions::default()).unwrap();
/// assert!(result.is_optimal());
/// assert!((result.objective - 12.0).abs() < 1e-6);
/// assert!((result.values[1] - 4.0).abs() < 1e-6);
/// ```
pub fn solve(model: &Model, options: &SolverOptions) -> Result<SolutionResult, ModelError> {
    let form = canonicalize(model)?;
    let outcome = solve_canonical(&form, options);

    let values = if outcome.status.is_optimal() {
        form.mapping.to_original(&outcome.canonical_values.to_vec())
    } else {
        vec![0.0; model.num_variables()]
    };

    Ok(SolutionResult {
        status: outcome.status,
        objective: outcome.objective,
        values,
        iterations: outcome.iterations,
        log: outcome.log,
        artifacts: outcome.artifacts,
    })
}

/// Solve a canonical form directly. The duality layer uses this entry to
/// solve an explicitly constructed dual without re-wrapping it.
pub fn solve_canonical(form: &CanonicalForm, options: &SolverOptions) -> CanonicalOutcome {
    let mut context = match Context::try_new(form, options) {
        Ok(context) => context,
        Err(message) => {
            debug!("solve failed before the first pivot: {}", message);
            return CanonicalOutcome::failed(
                SolveStatus::Error,
                0,
                message,
                form.num_columns(),
            );
        }
    };

    debug!(
        "starting solve: {} rows, {} columns, phase I required: {}",
        form.num_rows(),
        form.num_columns(),
        form.requires_phase_one,
    );

    if form.requires_phase_one {
        let costs = phase_one_costs(form);
        match context.run_phase(&costs, false, Phase::One) {
            PhaseExit::Optimal => {
                let infeasibility = context.objective_value(&costs);
                if infeasibility > PHASE_ONE_FEASIBILITY_TOLERANCE {
                    let _ = writeln!(
                        context.log,
                        "phase I ended with artificial infeasibility {:e}: model is infeasible",
                        infeasibility,
                    );
                    debug!("phase I infeasibility {:e}, model infeasible", infeasibility);
                    return context.into_failure(SolveStatus::Infeasible, form);
                }
                let _ = writeln!(context.log, "phase I found a feasible basis");
            }
            PhaseExit::Unbounded { .. } => {
                // The Phase I objective is bounded below by zero; reaching
                // this branch means the numerics broke down.
                let _ = writeln!(context.log, "phase I reported unbounded; numeric failure");
                return context.into_failure(SolveStatus::Error, form);
            }
            PhaseExit::IterationLimit => {
                return context.into_failure(SolveStatus::MaxIterationsReached, form);
            }
            PhaseExit::SingularBasis(message) => {
                let _ = writeln!(context.log, "singular basis in phase I: {}", message);
                return context.into_failure(SolveStatus::Error, form);
            }
        }
    }

    let maximize = form.sense == ObjectiveSense::Maximize;
    match context.run_phase(&form.objective, maximize, Phase::Two) {
        PhaseExit::Optimal => context.into_optimum(form),
        PhaseExit::Unbounded { column } => {
            let _ = writeln!(
                context.log,
                "column {} improves without an eligible leaving row: unbounded",
                column,
            );
            debug!("unbounded in direction of column {}", column);
            context.into_failure(SolveStatus::Unbounded, form)
        }
        PhaseExit::IterationLimit => {
            context.into_failure(SolveStatus::MaxIterationsReached, form)
        }
        PhaseExit::SingularBasis(message) => {
            let _ = writeln!(context.log, "singular basis in phase II: {}", message);
            context.into_failure(SolveStatus::Error, form)
        }
    }
}

fn phase_one_costs(form: &CanonicalForm) -> Array1<f64> {
    let mut costs = Array1::zeros(form.num_columns());
    for &column in &form.artificials {
        costs[column] = 1.0;
    }
    costs
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    One,
    Two,
}

enum PhaseExit {
    Optimal,
    Unbounded { column: usize },
    IterationLimit,
    SingularBasis(String),
}

/// All mutable solver state, local to one solve call. Two concurrent solves
/// never share anything.
struct Context<'a> {
    form: &'a CanonicalForm,
    options: &'a SolverOptions,
    basis: Vec<usize>,
    inverse: Array2<f64>,
    iterations: usize,
    log: String,
}

impl<'a> Context<'a> {
    fn try_new(form: &'a CanonicalForm, options: &'a SolverOptions) -> Result<Self, String> {
        let basis = initial_basis(form, options.tolerance)
            .ok_or_else(|| "no initial basis could be constructed".to_string())?;
        let inverse = invert_basis(form, &basis, options.tolerance)
            .map_err(|err| format!("initial basis is singular: {}", err))?;
        let mut log = String::new();
        let _ = writeln!(log, "initial basis: {:?}", basis);
        Ok(Self {
            form,
            options,
            basis,
            inverse,
            iterations: 0,
            log,
        })
    }

    /// Basic variable values `x_B = B^-1 b`.
    fn basic_values(&self) -> Array1<f64> {
        self.inverse.dot(&self.form.rhs)
    }

    /// Simplex multipliers `y = c_B B^-1` for the given cost vector.
    fn multipliers(&self, costs: &Array1<f64>) -> Array1<f64> {
        let basic_costs = Array1::from_iter(self.basis.iter().map(|&column| costs[column]));
        basic_costs.dot(&self.inverse)
    }

    /// Reduced costs `r_j = c_j - y A_j` for every column.
    fn reduced_costs(&self, costs: &Array1<f64>, multipliers: &Array1<f64>) -> Array1<f64> {
        Array1::from_iter(
            (0..self.form.num_columns())
                .map(|column| costs[column] - multipliers.dot(&self.form.matrix.column(column))),
        )
    }

    /// Objective value of the current basic solution under `costs`.
    fn objective_value(&self, costs: &Array1<f64>) -> f64 {
        let values = self.basic_values();
        self.basis
            .iter()
            .zip(values.iter())
            .map(|(&column, &value)| costs[column] * value.max(0.0))
            .sum()
    }

    fn in_basis(&self) -> Vec<bool> {
        let mut flags = vec![false; self.form.num_columns()];
        for &column in &self.basis {
            flags[column] = true;
        }
        flags
    }

    /// Run one phase to completion. The pivot mechanics are identical in
    /// both phases; only the cost vector and the optimization direction
    /// differ. Artificial columns never re-enter in Phase II.
    fn run_phase(&mut self, costs: &Array1<f64>, maximize: bool, phase: Phase) -> PhaseExit {
        let phase_name = match phase {
            Phase::One => "phase I",
            Phase::Two => "phase II",
        };
        let _ = writeln!(self.log, "{} starts at iteration {}", phase_name, self.iterations);

        loop {
            if self.iterations >= self.options.max_iterations {
                let _ = writeln!(
                    self.log,
                    "{}: iteration cap of {} reached",
                    phase_name, self.options.max_iterations,
                );
                debug!("{}: iteration cap reached", phase_name);
                return PhaseExit::IterationLimit;
            }

            let multipliers = self.multipliers(costs);
            let reduced = self.reduced_costs(costs, &multipliers);
            let Some(entering) = self.choose_entering(&reduced, maximize, phase) else {
                let _ = writeln!(
                    self.log,
                    "{}: optimal after {} iterations, objective {}",
                    phase_name,
                    self.iterations,
                    self.objective_value(costs),
                );
                debug!(
                    "{}: optimal after {} iterations",
                    phase_name, self.iterations,
                );
                return PhaseExit::Optimal;
            };

            let direction = self.inverse.dot(&self.form.matrix.column(entering));
            let Some(leaving) = self.choose_leaving(&direction) else {
                return PhaseExit::Unbounded { column: entering };
            };

            let _ = writeln!(
                self.log,
                "{}: iteration {}: column {} enters, column {} leaves row {}",
                phase_name, self.iterations, entering, self.basis[leaving], leaving,
            );
            self.basis[leaving] = entering;
            self.iterations += 1;

            match invert_basis(self.form, &self.basis, self.options.tolerance) {
                Ok(inverse) => self.inverse = inverse,
                Err(err) => return PhaseExit::SingularBasis(err.to_string()),
            }
        }
    }

    /// Entering column choice: Dantzig's most-improving reduced cost, or
    /// Bland's first improving column when anti-cycling is on.
    fn choose_entering(
        &self,
        reduced: &Array1<f64>,
        maximize: bool,
        phase: Phase,
    ) -> Option<usize> {
        let tolerance = self.options.tolerance;
        let in_basis = self.in_basis();
        let mut best: Option<(usize, f64)> = None;

        for column in 0..self.form.num_columns() {
            if in_basis[column] {
                continue;
            }
            if phase == Phase::Two && self.form.is_artificial(column) {
                continue;
            }
            let r = reduced[column];
            let improving = if maximize { r > tolerance } else { r < -tolerance };
            if !improving {
                continue;
            }
            if self.options.blands_rule {
                return Some(column);
            }
            if best.is_none_or(|(_, magnitude)| r.abs() > magnitude) {
                best = Some((column, r.abs()));
            }
        }

        best.map(|(column, _)| column)
    }

    /// Ratio test: among rows with a positive direction component, the one
    /// minimizing `x_B[i] / d[i]`. Iterating rows in ascending order and
    /// keeping the first strict minimum breaks ties by smallest row index.
    fn choose_leaving(&self, direction: &Array1<f64>) -> Option<usize> {
        let tolerance = self.options.tolerance;
        let values = self.basic_values();
        let mut best: Option<(usize, f64)> = None;

        for (row, &d) in direction.iter().enumerate() {
            if d <= tolerance {
                continue;
            }
            let ratio = values[row].max(0.0) / d;
            if best.is_none_or(|(_, current)| ratio < current - tolerance) {
                best = Some((row, ratio));
            }
        }

        best.map(|(row, _)| row)
    }

    /// Package the optimal basis into the exported artifact set.
    fn into_optimum(self, form: &CanonicalForm) -> CanonicalOutcome {
        let tolerance = self.options.tolerance;
        let values = self.basic_values();

        let mut canonical_values = Array1::zeros(form.num_columns());
        for (position, &column) in self.basis.iter().enumerate() {
            // clip rounding noise; basic values are feasible, so >= 0
            canonical_values[column] = values[position].max(0.0);
        }

        let multipliers = self.multipliers(&form.objective);
        let reduced = self.reduced_costs(&form.objective, &multipliers);

        let in_basis = self.in_basis();
        let alternate_optima = (0..form.num_columns()).any(|column| {
            !in_basis[column] && !form.is_artificial(column) && reduced[column].abs() < tolerance
        });

        // re-sign the multipliers so duals refer to the rows as written
        let duals = Array1::from_iter(
            multipliers
                .iter()
                .zip(&form.row_signs)
                .map(|(y, sign)| y * sign),
        );

        let objective = form.objective.dot(&canonical_values);
        let status = if alternate_optima {
            SolveStatus::AlternativeOptimal
        } else {
            SolveStatus::Optimal
        };

        let mut log = self.log;
        let _ = writeln!(
            log,
            "optimal objective {} after {} iterations (alternate optima: {})",
            objective, self.iterations, alternate_optima,
        );
        debug!(
            "optimal objective {} after {} iterations",
            objective, self.iterations,
        );

        CanonicalOutcome {
            status,
            objective,
            canonical_values,
            iterations: self.iterations,
            log,
            artifacts: Some(Artifacts {
                basis: self.basis,
                basis_inverse: self.inverse,
                reduced_costs: reduced,
                duals,
                alternate_optima,
            }),
        }
    }

    fn into_failure(self, status: SolveStatus, form: &CanonicalForm) -> CanonicalOutcome {
        CanonicalOutcome::failed(status, self.iterations, self.log, form.num_columns())
    }
}
