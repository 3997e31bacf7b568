use itertools::izip;
use log::debug;
use ndarray::{Array1, Array2};

use crate::canonical::canonical_form::{CanonicalForm, ColumnType};
use crate::canonical::variable_mapping::{AuxiliaryKind, VariableMapping};
use crate::model::{Model, ModelError, Relation, VariableType};
use crate::solver::options::DEFAULT_TOLERANCE;

/// Transform a model into standard form: equality rows over non-negative
/// columns, with a signed mapping back to the original variables.
///
/// The transformation is deterministic and pure. Canonical column indices
/// are assigned densely while scanning variables in order (`Unrestricted`
/// splits into two columns, `Negative` substitutes x = -y), then auxiliary
/// columns are appended row by row: a slack for <=, a surplus and an
/// artificial for >=, an artificial for =. Rows with a negative right-hand
/// side are multiplied by -1 (flipping their relation) first, so the
/// canonical right-hand side is always >= 0.
pub fn canonicalize(model: &Model) -> Result<CanonicalForm, ModelError> {
    model.validate()?;

    let mut mapping = VariableMapping::with_capacity(model.num_variables());
    for variable in &model.variables {
        let signs: &[f64] = match variable.variable_type {
            VariableType::Unrestricted => &[1.0, -1.0],
            VariableType::Negative => &[-1.0],
            _ => &[1.0],
        };
        mapping.push_variable(signs);
    }
    let num_structural = mapping.num_columns();

    // Row-sign normalization. The sign is reapplied when exporting duals.
    let mut row_signs = Vec::with_capacity(model.num_constraints());
    let mut normalized = Vec::with_capacity(model.num_constraints());
    for constraint in &model.constraints {
        let sign = if constraint.rhs < 0.0 { -1.0 } else { 1.0 };
        let relation = match (sign < 0.0, constraint.relation) {
            (true, Relation::LessEqual) => Relation::GreaterEqual,
            (true, Relation::GreaterEqual) => Relation::LessEqual,
            (_, relation) => relation,
        };
        let coefficients: Vec<f64> = constraint.coefficients.iter().map(|a| sign * a).collect();
        row_signs.push(sign);
        normalized.push((coefficients, relation, sign * constraint.rhs));
    }

    // Auxiliary columns, appended in row order: <= gets a +1 slack, >= gets
    // a -1 surplus then a +1 artificial, = gets a +1 artificial.
    let mut auxiliaries = Vec::with_capacity(model.num_constraints());
    let mut artificials = vec![];
    for (row, (_, relation, _)) in normalized.iter().enumerate() {
        let mut row_aux = vec![];
        match relation {
            Relation::LessEqual => {
                row_aux.push((mapping.push_auxiliary(AuxiliaryKind::Slack, row), 1.0));
            }
            Relation::GreaterEqual => {
                row_aux.push((mapping.push_auxiliary(AuxiliaryKind::Surplus, row), -1.0));
                let artificial = mapping.push_auxiliary(AuxiliaryKind::Artificial, row);
                row_aux.push((artificial, 1.0));
                artificials.push(artificial);
            }
            Relation::Equal => {
                let artificial = mapping.push_auxiliary(AuxiliaryKind::Artificial, row);
                row_aux.push((artificial, 1.0));
                artificials.push(artificial);
            }
        }
        auxiliaries.push(row_aux);
    }

    let num_rows = normalized.len();
    let num_columns = mapping.num_columns();

    let mut matrix = Array2::zeros((num_rows, num_columns));
    let mut rhs = Array1::zeros(num_rows);
    for (row, ((coefficients, _, b), row_aux)) in izip!(&normalized, &auxiliaries).enumerate() {
        let expanded = mapping.expand_row(coefficients, num_columns);
        for (column, value) in expanded.into_iter().enumerate() {
            matrix[[row, column]] = value;
        }
        for &(column, coefficient) in row_aux {
            matrix[[row, column]] = coefficient;
        }
        rhs[row] = *b;
    }

    let original_objective: Vec<f64> = model
        .variables
        .iter()
        .map(|v| v.objective_coefficient)
        .collect();
    let objective = Array1::from_vec(mapping.expand_row(&original_objective, num_columns));

    let mut lower = vec![0.0; num_columns];
    let mut upper = vec![f64::INFINITY; num_columns];
    let mut column_types = vec![ColumnType::Continuous; num_columns];
    for (variable_index, variable) in model.variables.iter().enumerate() {
        for &(column, sign) in mapping.pairs(variable_index) {
            if sign > 0.0 {
                lower[column] = variable.lower_bound.max(0.0);
                upper[column] = variable.upper_bound;
            } else {
                lower[column] = (-variable.upper_bound).max(0.0);
                upper[column] = if variable.lower_bound.is_finite() {
                    -variable.lower_bound
                } else {
                    f64::INFINITY
                };
            }
            column_types[column] = match variable.variable_type {
                VariableType::Integer => ColumnType::Integer,
                VariableType::Binary => ColumnType::Binary,
                _ => ColumnType::Continuous,
            };
        }
    }

    let requires_phase_one = !artificials.is_empty();
    let form = CanonicalForm {
        sense: model.sense,
        objective,
        matrix,
        rhs,
        lower,
        upper,
        column_types,
        mapping,
        artificials,
        row_signs,
        requires_phase_one,
    };
    form.validate(DEFAULT_TOLERANCE)?;

    debug!(
        "canonicalized model: {} rows, {} columns ({} structural), phase I required: {}",
        num_rows, num_columns, num_structural, form.requires_phase_one,
    );

    Ok(form)
}
