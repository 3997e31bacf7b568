use anyhow::Result;
use ndarray::Array2;

use crate::canonical::canonical_form::CanonicalForm;
use crate::canonical::variable_mapping::{AuxiliaryKind, ColumnOrigin};
use crate::math::matrix;

/// Pick a starting basis, one column per row.
///
/// The fallback chain per row: a true unit column (typically the row's
/// slack), then the artificial owning the row, then the unused column with
/// the largest-magnitude coefficient in the row. A seed from the last
/// fallback may not be canonical, but it is invertible, which is all the
/// first reinversion needs. Returns `None` when some row cannot be filled
/// at all; canonicalized input never triggers that.
pub(crate) fn initial_basis(form: &CanonicalForm, tolerance: f64) -> Option<Vec<usize>> {
    let m = form.num_rows();
    let n = form.num_columns();
    let mut basis = Vec::with_capacity(m);
    let mut used = vec![false; n];

    for row in 0..m {
        let mut chosen = None;

        for column in 0..n {
            if !used[column] && is_unit_column(form, column, row, tolerance) {
                chosen = Some(column);
                break;
            }
        }

        if chosen.is_none() {
            chosen = form.artificials.iter().copied().find(|&column| {
                !used[column]
                    && matches!(
                        form.mapping.origin(column),
                        ColumnOrigin::Auxiliary {
                            kind: AuxiliaryKind::Artificial,
                            row: owner,
                        } if *owner == row
                    )
            });
        }

        if chosen.is_none() {
            let mut best: Option<(usize, f64)> = None;
            for column in 0..n {
                if used[column] {
                    continue;
                }
                let magnitude = form.matrix[[row, column]].abs();
                if magnitude <= tolerance {
                    continue;
                }
                if best.is_none_or(|(_, m)| magnitude > m) {
                    best = Some((column, magnitude));
                }
            }
            chosen = best.map(|(column, _)| column);
        }

        let column = chosen?;
        used[column] = true;
        basis.push(column);
    }

    Some(basis)
}

fn is_unit_column(form: &CanonicalForm, column: usize, row: usize, tolerance: f64) -> bool {
    if (form.matrix[[row, column]] - 1.0).abs() > tolerance {
        return false;
    }
    for r in 0..form.num_rows() {
        if r != row && form.matrix[[r, column]].abs() > tolerance {
            return false;
        }
    }
    true
}

/// The basis matrix: the constraint columns selected by `basis`.
pub(crate) fn basis_matrix(form: &CanonicalForm, basis: &[usize]) -> Array2<f64> {
    let m = form.num_rows();
    let mut b = Array2::zeros((m, m));
    for (position, &column) in basis.iter().enumerate() {
        for row in 0..m {
            b[[row, position]] = form.matrix[[row, column]];
        }
    }
    b
}

/// Rebuild the basis matrix and invert it from scratch. Full reinversion per
/// pivot is the baseline this engine commits to; no incremental update.
pub(crate) fn invert_basis(
    form: &CanonicalForm,
    basis: &[usize],
    tolerance: f64,
) -> Result<Array2<f64>> {
    matrix::invert(&basis_matrix(form, basis), tolerance)
}
