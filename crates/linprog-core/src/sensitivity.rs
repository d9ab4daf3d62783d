use crate::canonical::CanonicalModel;
use crate::error::SolverError;
use crate::linalg;

/// Tolerance dedicated to the sensitivity analyzer (§4.7); distinct from
/// `SolverConfig`'s simplex tolerances since ranging arithmetic is far more
/// sensitive to rounding in the basis inverse.
pub const EPS: f64 = 1e-12;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Range {
    pub lower: f64,
    pub upper: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct SensitivityReport {
    /// One shadow price per constraint row.
    pub shadow_prices: Vec<f64>,
    /// One allowable range per tableau column (both decision and slack/
    /// artificial columns), expressed as an absolute range of `c_j`.
    pub objective_ranges: Vec<Range>,
    /// One allowable range per constraint row, expressed as a delta on the
    /// row's current RHS.
    pub rhs_ranges: Vec<Range>,
}

/// Reconstruct `A`, `b`, `c` from the canonical model and a solved basis,
/// then derive shadow prices and ranging intervals (§4.7). Mirrors
/// `revised_simplex`'s from-scratch basis-inverse approach rather than
/// reading off a mutated tableau.
pub fn analyze(cm: &CanonicalModel, basis: &[usize]) -> Result<SensitivityReport, SolverError> {
    let m = cm.m;
    let n = cm.total_columns();
    let a: Vec<Vec<f64>> = (0..m).map(|i| cm.tableau[i][0..n].to_vec()).collect();
    let b: Vec<f64> = (0..m).map(|i| cm.tableau[i][n]).collect();
    let c = &cm.c_full;

    let basis_matrix: Vec<Vec<f64>> = (0..m).map(|i| (0..m).map(|k| a[i][basis[k]]).collect()).collect();
    let inv = linalg::invert(&basis_matrix, EPS).map_err(SolverError::Canonical)?;
    let c_b: Vec<f64> = basis.iter().map(|&col| c[col]).collect();
    let y = linalg::mat_vec_mul_transposed(&inv, &c_b);
    let x_b = linalg::mat_vec_mul(&inv, &b);

    let column = |j: usize| -> Vec<f64> { (0..m).map(|i| a[i][j]).collect() };
    let reduced_cost = |j: usize| -> f64 {
        let a_j = column(j);
        c[j] - y.iter().zip(a_j.iter()).map(|(yi, ai)| yi * ai).sum::<f64>()
    };

    let objective_ranges = (0..n)
        .map(|j| {
            if let Some(i) = basis.iter().position(|&col| col == j) {
                basic_range(&a, &inv, &y, c, basis, i, m, n, EPS)
            } else {
                let r0 = reduced_cost(j);
                // Maximize convention: r0 <= 0 at optimum. Increasing c_j is
                // allowed up to the point r0 + delta = 0; decreasing it never
                // threatens optimality.
                Range { lower: f64::NEG_INFINITY, upper: c[j] - r0 }
            }
        })
        .collect();

    let rhs_ranges = (0..m)
        .map(|i| {
            let mut e_i = vec![0.0; m];
            e_i[i] = 1.0;
            let v = linalg::mat_vec_mul(&inv, &e_i);

            let mut decrease_bound = f64::INFINITY;
            let mut increase_bound = f64::INFINITY;
            for r in 0..m {
                if v[r] > EPS {
                    decrease_bound = decrease_bound.min(x_b[r] / v[r]);
                } else if v[r] < -EPS {
                    increase_bound = increase_bound.min(-x_b[r] / v[r]);
                }
            }
            Range { lower: -decrease_bound, upper: increase_bound }
        })
        .collect();

    Ok(SensitivityReport { shadow_prices: y, objective_ranges, rhs_ranges })
}

/// Allowable range for the cost of the basic variable sitting in basis
/// position `i`, expressed as an absolute range of `c_j` (`j = basis[i]`).
///
/// Perturbing `c_j` by `delta` shifts `y` by `delta * w` where `w = B^-T
/// e_i`, which shifts every non-basic reduced cost `r_k` by `-delta * a_k`
/// (`a_k = A_k^T w`). Optimality (`r_k <= 0`, maximize convention) requires
/// `delta >= r0_k / a_k` when `a_k > 0` (a floor on delta) and `delta <=
/// r0_k / a_k` when `a_k < 0` (a ceiling on delta).
#[allow(clippy::too_many_arguments)]
fn basic_range(
    a: &[Vec<f64>],
    inv: &[Vec<f64>],
    y: &[f64],
    c: &[f64],
    basis: &[usize],
    i: usize,
    m: usize,
    n: usize,
    eps: f64,
) -> Range {
    let mut e_i = vec![0.0; m];
    e_i[i] = 1.0;
    let w = linalg::mat_vec_mul_transposed(inv, &e_i);

    let mut delta_lower = f64::NEG_INFINITY;
    let mut delta_upper = f64::INFINITY;
    for k in 0..n {
        if basis.contains(&k) {
            continue;
        }
        let a_k: Vec<f64> = (0..m).map(|row| a[row][k]).collect();
        let coeff: f64 = a_k.iter().zip(w.iter()).map(|(ak, wk)| ak * wk).sum();
        let r0_k = c[k] - a_k.iter().zip(y.iter()).map(|(ak, yk)| ak * yk).sum::<f64>();

        if coeff > eps {
            delta_lower = delta_lower.max(r0_k / coeff);
        } else if coeff < -eps {
            delta_upper = delta_upper.min(r0_k / coeff);
        }
    }

    let c_j = c[basis[i]];
    Range {
        lower: if delta_lower.is_finite() { c_j + delta_lower } else { f64::NEG_INFINITY },
        upper: if delta_upper.is_finite() { c_j + delta_upper } else { f64::INFINITY },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical;
    use crate::config::SolverConfig;
    use crate::simplex;
    use linprog_parser::{ParsedConstraint, ParsedModel, Relation, Sense, SignRestriction};

    #[test]
    fn test_wyndor_glass_shadow_prices_and_ranges() {
        // Hillier & Lieberman's "Wyndor Glass": max 3x1+5x2, x1<=4, 2x2<=12,
        // 3x1+2x2<=18, optimum at (2, 6), z=36.
        let parsed = ParsedModel {
            sense: Sense::Maximize,
            objective: vec![3.0, 5.0],
            constraints: vec![
                ParsedConstraint { coefficients: vec![1.0, 0.0], relation: Relation::LessEqual, rhs: 4.0 },
                ParsedConstraint { coefficients: vec![0.0, 2.0], relation: Relation::LessEqual, rhs: 12.0 },
                ParsedConstraint { coefficients: vec![3.0, 2.0], relation: Relation::LessEqual, rhs: 18.0 },
            ],
            signs: vec![SignRestriction::NonNeg; 2],
            variable_names: ParsedModel::default_names(2),
        };
        let cfg = SolverConfig::default();
        let cm = canonical::build(&parsed, &cfg).unwrap();
        let log = simplex::solve(&cm, &cfg).unwrap();
        let report = analyze(&cm, log.final_basis()).unwrap();

        // Known shadow prices: y1=0, y2=1.5, y3=1.
        assert!((report.shadow_prices[0] - 0.0).abs() < 1e-6);
        assert!((report.shadow_prices[1] - 1.5).abs() < 1e-6);
        assert!((report.shadow_prices[2] - 1.0).abs() < 1e-6);

        // Known allowable ranges: c1 in [0, 7.5], c2 in [2, inf).
        let c1_range = report.objective_ranges[0];
        assert!((c1_range.lower - 0.0).abs() < 1e-6);
        assert!((c1_range.upper - 7.5).abs() < 1e-6);

        let c2_range = report.objective_ranges[1];
        assert!((c2_range.lower - 2.0).abs() < 1e-6);
        assert!(c2_range.upper.is_infinite());
    }

    #[test]
    fn test_rhs_ranges_are_finite_for_binding_constraints() {
        let parsed = ParsedModel {
            sense: Sense::Maximize,
            objective: vec![3.0, 5.0],
            constraints: vec![
                ParsedConstraint { coefficients: vec![1.0, 0.0], relation: Relation::LessEqual, rhs: 4.0 },
                ParsedConstraint { coefficients: vec![0.0, 2.0], relation: Relation::LessEqual, rhs: 12.0 },
                ParsedConstraint { coefficients: vec![3.0, 2.0], relation: Relation::LessEqual, rhs: 18.0 },
            ],
            signs: vec![SignRestriction::NonNeg; 2],
            variable_names: ParsedModel::default_names(2),
        };
        let cfg = SolverConfig::default();
        let cm = canonical::build(&parsed, &cfg).unwrap();
        let log = simplex::solve(&cm, &cfg).unwrap();
        let report = analyze(&cm, log.final_basis()).unwrap();

        // Row 2 and row 3 are binding; their RHS ranges must be bounded on
        // at least one side.
        assert!(report.rhs_ranges[1].lower.is_finite() || report.rhs_ranges[1].upper.is_finite());
        assert!(report.rhs_ranges[2].lower.is_finite() || report.rhs_ranges[2].upper.is_finite());
    }
}
