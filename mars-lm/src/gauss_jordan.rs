//! Gauss-Jordan elimination with partial pivoting.
//!
//! A singular system is not detected: the zero pivot is divided through and the resulting
//! NaN/Inf values are returned to the caller, who treats them as "no answer".

use crate::errors::LmError;

/// Dense row-major matrix.
pub type Matrix = Vec<Vec<f64>>;

///
/// Solve `left · X = right` for `X`.
///
/// `left` must be square (n×n) and `right` must have n rows of any (equal) width; passing the
/// identity as `right` yields the inverse of `left`.
///
/// # Arguments
/// - left: coefficient matrix
/// - right: right-hand side, one column per system to solve
///
pub fn gauss_jordan(left: &[Vec<f64>], right: &[Vec<f64>]) -> Result<Matrix, LmError> {
    let n = left.len();
    if let Some(row) = left.iter().find(|row| row.len() != n) {
        return Err(LmError::NotSquare {
            rows: n,
            cols: row.len(),
        });
    }
    if right.len() != n {
        return Err(LmError::DimensionMismatch {
            expected: n,
            found: right.len(),
        });
    }
    let width = right.first().map_or(0, |row| row.len());
    if let Some(row) = right.iter().find(|row| row.len() != width) {
        return Err(LmError::DimensionMismatch {
            expected: width,
            found: row.len(),
        });
    }

    let mut a: Matrix = left.to_vec();
    let mut b: Matrix = right.to_vec();

    for col in 0..n {
        // partial pivoting: largest magnitude in this column at or below the diagonal
        let mut pivot_row = col;
        let mut pivot_abs = a[col][col].abs();
        for (row, values) in a.iter().enumerate().skip(col + 1) {
            if values[col].abs() > pivot_abs {
                pivot_abs = values[col].abs();
                pivot_row = row;
            }
        }
        if pivot_row != col {
            a.swap(pivot_row, col);
            b.swap(pivot_row, col);
        }

        let pivot = a[col][col];
        for value in a[col].iter_mut() {
            *value /= pivot;
        }
        for value in b[col].iter_mut() {
            *value /= pivot;
        }

        eliminate(&mut a, &mut b, col);
    }

    Ok(b)
}

/// Clear column `col` of `a` in every row but the normalized pivot row, applying the same row
/// operations to `b`.
fn eliminate(a: &mut [Vec<f64>], b: &mut [Vec<f64>], col: usize) {
    let (a_above, a_rest) = a.split_at_mut(col);
    let (b_above, b_rest) = b.split_at_mut(col);
    let (Some((pivot_a, a_below)), Some((pivot_b, b_below))) =
        (a_rest.split_first_mut(), b_rest.split_first_mut())
    else {
        return;
    };

    let rows_a = a_above.iter_mut().chain(a_below.iter_mut());
    let rows_b = b_above.iter_mut().chain(b_below.iter_mut());
    for (row_a, row_b) in rows_a.zip(rows_b) {
        let factor = row_a[col];
        if factor == 0.0 {
            continue;
        }
        for (value, p) in row_a.iter_mut().zip(pivot_a.iter()) {
            *value -= factor * p;
        }
        for (value, p) in row_b.iter_mut().zip(pivot_b.iter()) {
            *value -= factor * p;
        }
    }
}

///
/// Inverse of a square matrix, by elimination against the identity.
///
pub fn invert(matrix: &[Vec<f64>]) -> Result<Matrix, LmError> {
    gauss_jordan(matrix, &identity(matrix.len()))
}

/// Solve `left · x = rhs` for a single right-hand-side vector.
pub fn solve_vector(left: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>, LmError> {
    let right: Matrix = rhs.iter().map(|v| vec![*v]).collect();
    Ok(gauss_jordan(left, &right)?
        .into_iter()
        .map(|row| row[0])
        .collect())
}

pub fn identity(n: usize) -> Matrix {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}
