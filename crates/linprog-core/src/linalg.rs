//! Minimal dense-matrix helpers shared by the canonical builder, the
//! revised simplex, and the sensitivity analyzer — all three need a basis
//! inverse at some point and none of them needs more than Gauss-Jordan
//! elimination with partial pivoting to get it.

/// Invert a square matrix via Gauss-Jordan elimination with partial
/// pivoting. Fails if the largest available pivot magnitude in any column
/// falls below `eps_pivot` (a singular, or numerically singular, basis).
pub fn invert(matrix: &[Vec<f64>], eps_pivot: f64) -> Result<Vec<Vec<f64>>, String> {
    let n = matrix.len();
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut inv: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_val = a[col][col].abs();
        for row in (col + 1)..n {
            if a[row][col].abs() > pivot_val {
                pivot_val = a[row][col].abs();
                pivot_row = row;
            }
        }
        if pivot_val < eps_pivot {
            return Err("singular basis".to_string());
        }
        if pivot_row != col {
            a.swap(col, pivot_row);
            inv.swap(col, pivot_row);
        }

        let pivot = a[col][col];
        for j in 0..n {
            a[col][j] /= pivot;
            inv[col][j] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor.abs() <= eps_pivot {
                continue;
            }
            for j in 0..n {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Ok(inv)
}

/// `y = Bᵀ⁻¹ c_b`, i.e. `(c_bᵀ B⁻¹)ᵀ`.
pub fn mat_vec_mul_transposed(inv: &[Vec<f64>], c_b: &[f64]) -> Vec<f64> {
    let n = inv.len();
    let mut y = vec![0.0; n];
    for j in 0..n {
        let mut acc = 0.0;
        for i in 0..n {
            acc += c_b[i] * inv[i][j];
        }
        y[j] = acc;
    }
    y
}

/// `B⁻¹ v`
pub fn mat_vec_mul(inv: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    let n = inv.len();
    let mut out = vec![0.0; n];
    for i in 0..n {
        let mut acc = 0.0;
        for j in 0..n {
            acc += inv[i][j] * v[j];
        }
        out[i] = acc;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_identity() {
        let m = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let inv = invert(&m, 1e-12).unwrap();
        assert_eq!(inv, m);
    }

    #[test]
    fn test_invert_2x2() {
        let m = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
        let inv = invert(&m, 1e-12).unwrap();
        // A^-1 = 1/10 * [[6, -7], [-2, 4]]
        assert!((inv[0][0] - 0.6).abs() < 1e-9);
        assert!((inv[0][1] - (-0.7)).abs() < 1e-9);
        assert!((inv[1][0] - (-0.2)).abs() < 1e-9);
        assert!((inv[1][1] - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_invert_singular() {
        let m = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(invert(&m, 1e-12).is_err());
    }
}
