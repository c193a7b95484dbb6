use crate::error::{Error, Result};

/// A correlation (or rating) matrix. Cells are `None` where the value is
/// undefined: a missing rating, or a correlation with no valid pairs or
/// zero variance.
pub type Matrix = Vec<Vec<Option<f64>>>;

// ---------------------------------------------------------------------------
// Means and spread
// ---------------------------------------------------------------------------

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean over the defined, non-NaN values. `None` when nothing is left.
/// Infinities are kept and propagate into the result.
pub fn nanmean(values: &[Option<f64>]) -> Option<f64> {
    let kept: Vec<f64> = values
        .iter()
        .filter_map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    mean(&kept)
}

/// Population standard deviation. `None` for an empty slice.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Pearson correlation between two index-aligned vectors with
/// pairwise-complete handling of missing values.
///
/// Pairs where either side is `None` (or NaN) are excluded; the means are
/// computed over the kept pairs only. Returns `Ok(None)` when no defined
/// pair remains or when either side has zero variance over the kept pairs
/// (a single pair always lands here). A length mismatch is an input-shape
/// error, not a data condition, and fails with [`Error::LengthMismatch`].
pub fn correlate(x: &[Option<f64>], y: &[Option<f64>]) -> Result<Option<f64>> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }

    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.is_empty() {
        return Ok(None);
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut num = 0.0;
    let mut den_x = 0.0;
    let mut den_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        num += dx * dy;
        den_x += dx * dx;
        den_y += dy * dy;
    }

    let denom = den_x.sqrt() * den_y.sqrt();
    if denom == 0.0 {
        return Ok(None);
    }
    Ok(Some(num / denom))
}

/// Pairwise Pearson correlation matrix over a set of index-aligned columns.
///
/// The result is square and symmetric, with the diagonal pinned to exactly
/// `1.0` (never computed, so a zero-variance column still correlates
/// perfectly with itself). All columns must have the same length.
pub fn corrcoef(columns: &[Vec<Option<f64>>]) -> Result<Matrix> {
    if let Some(first) = columns.first() {
        for col in &columns[1..] {
            if col.len() != first.len() {
                return Err(Error::LengthMismatch {
                    left: first.len(),
                    right: col.len(),
                });
            }
        }
    }

    let n = columns.len();
    let mut matrix: Matrix = vec![vec![None; n]; n];
    for i in 0..n {
        matrix[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = correlate(&columns[i], &columns[j])?;
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    Ok(matrix)
}

// ---------------------------------------------------------------------------
// Upper triangle extraction
// ---------------------------------------------------------------------------

/// Index pairs (row, col) of the upper triangle of an `n`×`n` matrix,
/// starting `k` diagonals above the main one. `k = 1` skips the diagonal.
pub fn triu_indices(n: usize, k: usize) -> Vec<(usize, usize)> {
    let mut indices = Vec::new();
    for i in 0..n {
        for j in (i + k)..n {
            indices.push((i, j));
        }
    }
    indices
}

/// The values of the upper triangle of a square matrix, row by row,
/// starting `k` diagonals above the main one. Non-square input fails with
/// [`Error::DimensionMismatch`].
pub fn upper_triangle(matrix: &Matrix, k: usize) -> Result<Vec<Option<f64>>> {
    let n = matrix.len();
    for row in matrix {
        if row.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: row.len(),
            });
        }
    }
    Ok(triu_indices(n, k)
        .into_iter()
        .map(|(i, j)| matrix[i][j])
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
