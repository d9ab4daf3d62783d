use crate::canonical::CanonicalModel;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::linalg;
use crate::log::{PriceOutEntry, ProductFormEntry, SimplexLog};

/// Revised simplex (§4.3): same pivot rules and external contract as the
/// tableau form, but maintains an explicit basis inverse instead of the
/// full dense tableau and re-inverts from scratch every iteration.
pub fn solve(cm: &CanonicalModel, config: &SolverConfig) -> Result<SimplexLog, SolverError> {
    let m = cm.m;
    let n = cm.total_columns();

    // The canonical builder's initial tableau has B = I, so its top m rows
    // are exactly [A | b] before any pivoting has touched them.
    let a: Vec<Vec<f64>> = (0..m).map(|i| cm.tableau[i][0..n].to_vec()).collect();
    let b: Vec<f64> = (0..m).map(|i| cm.tableau[i][n]).collect();
    let c = &cm.c_full;

    let mut basis = cm.basis.clone();

    let mut log = SimplexLog::new(cm.variable_names.clone(), c.clone(), m, n, cm.original_sense);
    record_tableau_snapshot(&mut log, &a, &b, c, &basis, config.eps_pivot, None, None)?;

    let mut iterations = 0usize;
    let optimal = loop {
        if iterations >= config.simplex_max_iterations {
            break false;
        }

        let basis_matrix: Vec<Vec<f64>> = (0..m).map(|i| (0..m).map(|k| a[i][basis[k]]).collect()).collect();
        let inv = linalg::invert(&basis_matrix, config.eps_pivot)
            .map_err(|_| SolverError::Canonical("singular basis".to_string()))?;
        let c_b: Vec<f64> = basis.iter().map(|&col| c[col]).collect();
        let y = linalg::mat_vec_mul_transposed(&inv, &c_b);

        let reduced_costs: Vec<f64> = (0..n)
            .map(|j| {
                let a_j: Vec<f64> = (0..m).map(|i| a[i][j]).collect();
                let y_dot_a_j: f64 = y.iter().zip(a_j.iter()).map(|(yi, ai)| yi * ai).sum();
                c[j] - y_dot_a_j
            })
            .collect();
        let z: f64 = y.iter().zip(b.iter()).map(|(yi, bi)| yi * bi).sum();

        let entering = (0..n)
            .filter(|j| !basis.contains(j))
            .find(|&j| reduced_costs[j] > config.eps_redcost);

        log.price_out.push(PriceOutEntry { y: y.clone(), reduced_costs: reduced_costs.clone(), entering, z });

        let Some(entering) = entering else {
            break true;
        };

        let x_b = linalg::mat_vec_mul(&inv, &b);
        let a_entering: Vec<f64> = (0..m).map(|i| a[i][entering]).collect();
        let direction = linalg::mat_vec_mul(&inv, &a_entering);

        let leaving = ratio_test(&direction, &x_b, &basis, config.eps_pivot);

        let Some(leaving) = leaving else {
            return Err(SolverError::Unbounded(Box::new(log)));
        };

        let theta = x_b[leaving] / direction[leaving];
        let x_b_after: Vec<f64> = x_b
            .iter()
            .zip(direction.iter())
            .map(|(&xi, &di)| xi - theta * di)
            .collect();

        log.product_form.push(ProductFormEntry {
            direction: direction.clone(),
            x_b_before: x_b.clone(),
            theta,
            x_b_after,
            leaving_row: leaving,
        });

        basis[leaving] = entering;
        iterations += 1;
        record_tableau_snapshot(&mut log, &a, &b, c, &basis, config.eps_pivot, Some(entering), Some(leaving))?;
        tracing::trace!(iteration = iterations, entering, leaving, z, "revised simplex pivot");
    };

    if !optimal {
        return Err(SolverError::IterationLimit { iterations, log: Box::new(log) });
    }

    if has_positive_artificial(cm, &log, config.eps_feas) {
        return Err(SolverError::Infeasible(Box::new(log)));
    }

    Ok(log)
}

/// Minimum-ratio test, ties broken by the smaller *basis column index*
/// rather than row position (per the revised solver's own tie-break rule).
fn ratio_test(direction: &[f64], x_b: &[f64], basis: &[usize], eps_pivot: f64) -> Option<usize> {
    let m = direction.len();
    let mut best: Option<(usize, f64)> = None;
    for i in 0..m {
        if direction[i] > eps_pivot {
            let ratio = x_b[i] / direction[i];
            match best {
                None => best = Some((i, ratio)),
                Some((best_row, best_ratio)) => {
                    if ratio < best_ratio - eps_pivot
                        || (ratio <= best_ratio + eps_pivot && basis[i] < basis[best_row])
                    {
                        best = Some((i, ratio));
                    }
                }
            }
        }
    }
    best.map(|(row, _)| row)
}

/// Reconstruct a full `(m+1) x (n+1)` tableau for the current basis so the
/// log is interchangeable with the tableau-form solver's output (same
/// consumers: `CanonicalModel::decision_value`/`report_objective`).
fn record_tableau_snapshot(
    log: &mut SimplexLog,
    a: &[Vec<f64>],
    b: &[f64],
    c: &[f64],
    basis: &[usize],
    eps_pivot: f64,
    entering: Option<usize>,
    leaving: Option<usize>,
) -> Result<(), SolverError> {
    let m = a.len();
    let n = a[0].len();

    let basis_matrix: Vec<Vec<f64>> = (0..m).map(|i| (0..m).map(|k| a[i][basis[k]]).collect()).collect();
    let inv = linalg::invert(&basis_matrix, eps_pivot)
        .map_err(|_| SolverError::Canonical("singular basis".to_string()))?;
    let c_b: Vec<f64> = basis.iter().map(|&col| c[col]).collect();
    let y = linalg::mat_vec_mul_transposed(&inv, &c_b);
    let x_b = linalg::mat_vec_mul(&inv, b);

    let mut tableau = vec![vec![0.0; n + 1]; m + 1];
    for i in 0..m {
        for j in 0..n {
            let a_j: Vec<f64> = (0..m).map(|k| a[k][j]).collect();
            tableau[i][j] = linalg::mat_vec_mul(&inv, &a_j)[i];
        }
        tableau[i][n] = x_b[i];
    }
    for j in 0..n {
        let a_j: Vec<f64> = (0..m).map(|i| a[i][j]).collect();
        let y_dot_a_j: f64 = y.iter().zip(a_j.iter()).map(|(yi, ai)| yi * ai).sum();
        tableau[m][j] = c[j] - y_dot_a_j;
    }
    let y_dot_b: f64 = y.iter().zip(b.iter()).map(|(yi, bi)| yi * bi).sum();
    tableau[m][n] = y_dot_b;

    log.record_iteration(&tableau, basis, entering, leaving);
    Ok(())
}

fn has_positive_artificial(cm: &CanonicalModel, log: &SimplexLog, eps_feas: f64) -> bool {
    let artificial_start = cm.n_decision + cm.n_slack;
    let tableau = log.final_tableau();
    let basis = log.final_basis();
    let rhs_col = tableau[0].len() - 1;
    basis
        .iter()
        .enumerate()
        .any(|(row, &col)| col >= artificial_start && tableau[row][rhs_col] > eps_feas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical;
    use linprog_parser::{ParsedConstraint, ParsedModel, Relation, Sense, SignRestriction};

    fn signs(n: usize) -> Vec<SignRestriction> {
        vec![SignRestriction::NonNeg; n]
    }

    #[test]
    fn test_matches_tableau_form_on_s1() {
        let parsed = ParsedModel {
            sense: Sense::Maximize,
            objective: vec![3.0, 5.0],
            constraints: vec![
                ParsedConstraint { coefficients: vec![1.0, 0.0], relation: Relation::LessEqual, rhs: 4.0 },
                ParsedConstraint { coefficients: vec![0.0, 2.0], relation: Relation::LessEqual, rhs: 12.0 },
                ParsedConstraint { coefficients: vec![3.0, 2.0], relation: Relation::LessEqual, rhs: 18.0 },
            ],
            signs: signs(2),
            variable_names: ParsedModel::default_names(2),
        };
        let cfg = SolverConfig::default();
        let cm = canonical::build(&parsed, &cfg).unwrap();
        let log = solve(&cm, &cfg).unwrap();
        let z = cm.report_objective(log.final_tableau(), log.final_basis());
        assert!((z - 36.0).abs() < 1e-6, "z = {z}");
        let values = cm.decision_values(log.final_tableau(), log.final_basis());
        assert!((values[0] - 2.0).abs() < 1e-6);
        assert!((values[1] - 6.0).abs() < 1e-6);
        assert!(!log.price_out.is_empty());
        assert!(!log.product_form.is_empty());
    }

    #[test]
    fn test_equality_with_artificial() {
        let parsed = ParsedModel {
            sense: Sense::Minimize,
            objective: vec![2.0, 3.0],
            constraints: vec![ParsedConstraint { coefficients: vec![1.0, 1.0], relation: Relation::Equal, rhs: 10.0 }],
            signs: signs(2),
            variable_names: ParsedModel::default_names(2),
        };
        let cfg = SolverConfig::default();
        let cm = canonical::build(&parsed, &cfg).unwrap();
        let log = solve(&cm, &cfg).unwrap();
        let z = cm.report_objective(log.final_tableau(), log.final_basis());
        assert!((z - 20.0).abs() < 1e-6, "z = {z}");
    }

    #[test]
    fn test_unbounded() {
        let parsed = ParsedModel {
            sense: Sense::Maximize,
            objective: vec![1.0, 0.0],
            constraints: vec![ParsedConstraint { coefficients: vec![-1.0, 1.0], relation: Relation::LessEqual, rhs: 1.0 }],
            signs: signs(2),
            variable_names: ParsedModel::default_names(2),
        };
        let cfg = SolverConfig::default();
        let cm = canonical::build(&parsed, &cfg).unwrap();
        let err = solve(&cm, &cfg).unwrap_err();
        assert!(matches!(err, SolverError::Unbounded(_)));
    }

    #[test]
    fn test_infeasible() {
        let parsed = ParsedModel {
            sense: Sense::Maximize,
            objective: vec![1.0, 1.0],
            constraints: vec![
                ParsedConstraint { coefficients: vec![1.0, 1.0], relation: Relation::LessEqual, rhs: 1.0 },
                ParsedConstraint { coefficients: vec![1.0, 1.0], relation: Relation::GreaterEqual, rhs: 3.0 },
            ],
            signs: signs(2),
            variable_names: ParsedModel::default_names(2),
        };
        let cfg = SolverConfig::default();
        let cm = canonical::build(&parsed, &cfg).unwrap();
        let err = solve(&cm, &cfg).unwrap_err();
        assert!(matches!(err, SolverError::Infeasible(_)));
    }
}
