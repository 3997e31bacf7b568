use log::debug;
use ndarray::Array1;

use crate::canonical::canonical_form::CanonicalForm;
use crate::canonical::canonicalizer::canonicalize;
use crate::model::{Model, ModelError, ObjectiveSense};
use crate::solver::options::DEFAULT_TOLERANCE;
use crate::solver::result::{Artifacts, SolutionResult};

/// How far a coefficient may move in each direction before the optimal
/// basis stops being optimal. Both fields are non-negative magnitudes;
/// `f64::INFINITY` means unbounded in that direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeInterval {
    pub allowable_decrease: f64,
    pub allowable_increase: f64,
}

/// Cost range of one canonical column.
#[derive(Clone, Debug)]
pub struct ColumnCostRange {
    /// Canonical column index.
    pub column: usize,
    /// The original variable this column derives from, if structural.
    pub variable: Option<usize>,
    /// Whether the column is basic at the optimum.
    pub basic: bool,
    pub range: RangeInterval,
}

/// Right-hand side range of one constraint, in the orientation the
/// constraint was written in.
#[derive(Clone, Debug)]
pub struct RhsRange {
    pub constraint: usize,
    pub range: RangeInterval,
}

/// Shadow prices (dual values) of an optimal result, one per constraint in
/// the original row orientation. Taken from the exported artifacts.
pub fn shadow_prices(result: &SolutionResult) -> Result<Array1<f64>, ModelError> {
    Ok(optimal_artifacts(result)?.duals.clone())
}

/// Recompute the dual values from the basis alone: `y = c_B B^-1`, then
/// re-signed per row to the original orientation. Agrees with the duals the
/// engine exports; exposed so drivers can cross-check a stored basis.
pub fn duals_from_basis(form: &CanonicalForm, artifacts: &Artifacts) -> Array1<f64> {
    let basic_costs = Array1::from_iter(
        artifacts.basis.iter().map(|&column| form.objective[column]),
    );
    let multipliers = basic_costs.dot(&artifacts.basis_inverse);
    Array1::from_iter(
        multipliers
            .iter()
            .zip(&form.row_signs)
            .map(|(y, sign)| y * sign),
    )
}

/// Objective coefficient ranging over every non-artificial canonical
/// column of an optimal result.
///
/// Nonbasic columns stay nonbasic until their reduced cost reaches zero,
/// so the binding side is `|r_j|` and the other side is unbounded. For a
/// basic column the perturbation propagates into every nonbasic reduced
/// cost through the basis inverse, and the range is the intersection of
/// the intervals that keep each of them on the optimal side.
pub fn cost_ranges(
    model: &Model,
    result: &SolutionResult,
) -> Result<Vec<ColumnCostRange>, ModelError> {
    let artifacts = optimal_artifacts(result)?;
    let form = canonicalize(model)?;
    let maximize = form.sense == ObjectiveSense::Maximize;

    let mut position_of = vec![None; form.num_columns()];
    for (position, &column) in artifacts.basis.iter().enumerate() {
        position_of[column] = Some(position);
    }

    let mut ranges = Vec::new();
    for column in 0..form.num_columns() {
        if form.is_artificial(column) {
            continue;
        }
        let range = match position_of[column] {
            None => nonbasic_cost_range(artifacts.reduced_costs[column], maximize),
            Some(position) => {
                basic_cost_range(&form, artifacts, &position_of, position, maximize)
            }
        };
        ranges.push(ColumnCostRange {
            column,
            variable: form.mapping.original_variable(column),
            basic: position_of[column].is_some(),
            range,
        });
    }
    debug!("cost ranging over {} columns", ranges.len());
    Ok(ranges)
}

fn nonbasic_cost_range(reduced_cost: f64, maximize: bool) -> RangeInterval {
    // the binding direction is the one that drives the reduced cost to zero
    if maximize {
        RangeInterval {
            allowable_decrease: f64::INFINITY,
            allowable_increase: reduced_cost.abs(),
        }
    } else {
        RangeInterval {
            allowable_decrease: reduced_cost.abs(),
            allowable_increase: f64::INFINITY,
        }
    }
}

fn basic_cost_range(
    form: &CanonicalForm,
    artifacts: &Artifacts,
    position_of: &[Option<usize>],
    position: usize,
    maximize: bool,
) -> RangeInterval {
    let inverse_row = artifacts.basis_inverse.row(position);
    let mut delta_low = f64::NEG_INFINITY;
    let mut delta_high = f64::INFINITY;

    for column in 0..form.num_columns() {
        if position_of[column].is_some() || form.is_artificial(column) {
            continue;
        }
        // a perturbation delta on the basic cost shifts this reduced cost
        // by -delta * alpha
        let alpha = inverse_row.dot(&form.matrix.column(column));
        if alpha.abs() <= DEFAULT_TOLERANCE {
            continue;
        }
        let r = artifacts.reduced_costs[column];
        let bound = r / alpha;
        let bounds_above = if maximize { alpha < 0.0 } else { alpha > 0.0 };
        if bounds_above {
            delta_high = delta_high.min(bound);
        } else {
            delta_low = delta_low.max(bound);
        }
    }

    RangeInterval {
        allowable_decrease: -delta_low,
        allowable_increase: delta_high,
    }
}

/// Right-hand side ranging of an optimal result, one entry per constraint.
///
/// A perturbation `delta` on row `i` moves the basic values along column
/// `i` of the basis inverse; the range keeps them all non-negative. Rows
/// flipped during canonicalization get their interval mirrored back to the
/// orientation the constraint was written in.
pub fn rhs_ranges(
    model: &Model,
    result: &SolutionResult,
) -> Result<Vec<RhsRange>, ModelError> {
    let artifacts = optimal_artifacts(result)?;
    let form = canonicalize(model)?;
    let basic_values = artifacts.basis_inverse.dot(&form.rhs);

    let mut ranges = Vec::with_capacity(form.num_rows());
    for row in 0..form.num_rows() {
        let shift = artifacts.basis_inverse.column(row);
        let mut delta_low = f64::NEG_INFINITY;
        let mut delta_high = f64::INFINITY;
        for (value, u) in basic_values.iter().zip(shift.iter()) {
            if u.abs() <= DEFAULT_TOLERANCE {
                continue;
            }
            let bound = -value / u;
            if *u > 0.0 {
                delta_low = delta_low.max(bound);
            } else {
                delta_high = delta_high.min(bound);
            }
        }
        // a flipped row was multiplied by -1, so increase and decrease swap
        let range = if form.row_signs[row] > 0.0 {
            RangeInterval {
                allowable_decrease: -delta_low,
                allowable_increase: delta_high,
            }
        } else {
            RangeInterval {
                allowable_decrease: delta_high,
                allowable_increase: -delta_low,
            }
        };
        ranges.push(RhsRange {
            constraint: row,
            range,
        });
    }
    debug!("rhs ranging over {} rows", ranges.len());
    Ok(ranges)
}

fn optimal_artifacts(result: &SolutionResult) -> Result<&Artifacts, ModelError> {
    result
        .artifacts
        .as_ref()
        .filter(|_| result.is_optimal())
        .ok_or_else(|| {
            ModelError::Internal(
                "sensitivity analysis requires an optimal result with artifacts".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Constraint, Relation, Variable};
    use crate::solver::engine::solve;
    use crate::solver::options::SolverOptions;

    fn concrete_model() -> Model {
        // maximize 2 x1 + 3 x2, x1 + x2 <= 4, x1 <= 2
        let mut model = Model::new(ObjectiveSense::Maximize);
        model.add_variable(Variable::positive("x1", 2.0));
        model.add_variable(Variable::positive("x2", 3.0));
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessEqual, 4.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessEqual, 2.0));
        model
    }

    fn solved(model: &Model) -> SolutionResult {
        solve(model, &SolverOptions::default()).unwrap()
    }

    #[test]
    fn shadow_prices_match_exported_duals() {
        let model = concrete_model();
        let result = solved(&model);
        let prices = shadow_prices(&result).unwrap();
        assert!((prices[0] - 3.0).abs() < 1e-9);
        assert!(prices[1].abs() < 1e-9);
    }

    #[test]
    fn recomputed_duals_agree_with_exported() {
        let model = concrete_model();
        let result = solved(&model);
        let form = canonicalize(&model).unwrap();
        let artifacts = result.artifacts.as_ref().unwrap();
        let recomputed = duals_from_basis(&form, artifacts);
        for (a, b) in recomputed.iter().zip(artifacts.duals.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn flipped_row_duals_keep_original_orientation() {
        // -x1 - x2 <= -4 is flipped to x1 + x2 >= 4 internally; the dual
        // must still refer to the row as written
        let mut model = Model::new(ObjectiveSense::Minimize);
        model.add_variable(Variable::positive("x1", 3.0));
        model.add_variable(Variable::positive("x2", 2.0));
        model.add_constraint(Constraint::new(vec![-1.0, -1.0], Relation::LessEqual, -4.0));

        let result = solved(&model);
        assert!(result.is_optimal());
        assert!((result.objective - 8.0).abs() < 1e-6);
        let prices = shadow_prices(&result).unwrap();
        // tightening the written row by one unit (rhs -4 -> -5) forces one
        // more unit of x2 and raises the objective by 2
        assert!((prices[0] + 2.0).abs() < 1e-6);
    }

    #[test]
    fn nonbasic_cost_range_binds_at_reduced_cost() {
        let model = concrete_model();
        let result = solved(&model);
        let ranges = cost_ranges(&model, &result).unwrap();
        // column 0 is x1, nonbasic with reduced cost -1
        let x1 = &ranges[0];
        assert_eq!(x1.variable, Some(0));
        assert!(!x1.basic);
        assert!((x1.range.allowable_increase - 1.0).abs() < 1e-9);
        assert!(x1.range.allowable_decrease.is_infinite());
    }

    #[test]
    fn basic_cost_range_intersects_nonbasic_conditions() {
        let model = concrete_model();
        let result = solved(&model);
        let ranges = cost_ranges(&model, &result).unwrap();
        // column 1 is x2, basic; lowering its coefficient below 2 would let
        // x1 enter, raising it never hurts
        let x2 = &ranges[1];
        assert_eq!(x2.variable, Some(1));
        assert!(x2.basic);
        assert!((x2.range.allowable_decrease - 1.0).abs() < 1e-9);
        assert!(x2.range.allowable_increase.is_infinite());
    }

    #[test]
    fn artificial_columns_are_skipped() {
        let mut model = Model::new(ObjectiveSense::Minimize);
        model.add_variable(Variable::positive("x1", 1.0));
        model.add_constraint(Constraint::new(vec![1.0], Relation::Equal, 2.0));
        let result = solved(&model);
        let ranges = cost_ranges(&model, &result).unwrap();
        let form = canonicalize(&model).unwrap();
        assert!(ranges.iter().all(|r| !form.is_artificial(r.column)));
    }

    #[test]
    fn rhs_ranges_keep_basis_feasible() {
        let model = concrete_model();
        let result = solved(&model);
        let ranges = rhs_ranges(&model, &result).unwrap();
        // row 0 binds with x2 = 4 basic: it can fall by 4 before x2 goes
        // negative, and grow forever
        assert!((ranges[0].range.allowable_decrease - 4.0).abs() < 1e-9);
        assert!(ranges[0].range.allowable_increase.is_infinite());
        // row 1 is slack by 2
        assert!((ranges[1].range.allowable_decrease - 2.0).abs() < 1e-9);
        assert!(ranges[1].range.allowable_increase.is_infinite());
    }

    #[test]
    fn flipped_row_rhs_range_is_mirrored() {
        let mut model = Model::new(ObjectiveSense::Minimize);
        model.add_variable(Variable::positive("x1", 3.0));
        model.add_variable(Variable::positive("x2", 2.0));
        model.add_constraint(Constraint::new(vec![-1.0, -1.0], Relation::LessEqual, -4.0));

        let result = solved(&model);
        let ranges = rhs_ranges(&model, &result).unwrap();
        // internally the row reads x1 + x2 >= 4 with decrease 4; written as
        // rhs -4 the same slack appears on the increase side
        assert!((ranges[0].range.allowable_increase - 4.0).abs() < 1e-6);
    }

    #[test]
    fn analysis_rejects_non_optimal_results() {
        // unbounded model carries no artifacts
        let mut model = Model::new(ObjectiveSense::Maximize);
        model.add_variable(Variable::positive("x1", 1.0));
        let result = solved(&model);
        assert!(shadow_prices(&result).is_err());
        assert!(cost_ranges(&model, &result).is_err());
        assert!(rhs_ranges(&model, &result).is_err());
    }
}
