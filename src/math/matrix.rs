use anyhow::{Result, anyhow};
use ndarray::Array2;

/// Invert a dense square matrix by Gauss-Jordan elimination with partial
/// pivoting.
///
/// Pivots smaller in magnitude than `pivot_tolerance` make the matrix
/// singular for our purposes and yield an error.
pub fn invert(matrix: &Array2<f64>, pivot_tolerance: f64) -> Result<Array2<f64>> {
    let n = matrix.nrows();
    assert_eq!(n, matrix.ncols());

    //optimisation: size-zero matrix
    if n == 0 {
        return Ok(matrix.clone());
    }

    //optimisation: size-one matrix
    if n == 1 {
        if matrix[[0, 0]].abs() <= pivot_tolerance {
            return Err(anyhow!("matrix is not invertible"));
        }
        return Ok(Array2::from_elem((1, 1), 1.0 / matrix[[0, 0]]));
    }

    //augment with the identity
    let mut augmented = Array2::zeros((n, 2 * n));
    for r in 0..n {
        for c in 0..n {
            augmented[[r, c]] = matrix[[r, c]];
        }
        augmented[[r, n + r]] = 1.0;
    }

    for col in 0..n {
        //partial pivoting: bring the largest-magnitude entry into place
        let mut pivot_row = col;
        for r in (col + 1)..n {
            if augmented[[r, col]].abs() > augmented[[pivot_row, col]].abs() {
                pivot_row = r;
            }
        }
        if augmented[[pivot_row, col]].abs() <= pivot_tolerance {
            return Err(anyhow!("matrix is not invertible"));
        }
        if pivot_row != col {
            for c in 0..(2 * n) {
                augmented.swap((col, c), (pivot_row, c));
            }
        }

        let pivot = augmented[[col, col]];
        for c in 0..(2 * n) {
            augmented[[col, c]] /= pivot;
        }
        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = augmented[[r, col]];
            if factor == 0.0 {
                continue;
            }
            for c in 0..(2 * n) {
                augmented[[r, c]] -= factor * augmented[[col, c]];
            }
        }
    }

    let mut inverse = Array2::zeros((n, n));
    for r in 0..n {
        for c in 0..n {
            inverse[[r, c]] = augmented[[r, n + c]];
        }
    }
    Ok(inverse)
}
