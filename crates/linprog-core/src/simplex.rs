use crate::canonical::CanonicalModel;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::log::SimplexLog;

/// Primal simplex over the dense tableau (§4.2). Deterministic Bland's-rule
/// pivoting: lowest-index entering column, lowest-index leaving row on
/// ratio ties. Big-M is already folded into the objective row by the
/// canonical builder, so this is a single-phase solve.
pub fn solve(cm: &CanonicalModel, config: &SolverConfig) -> Result<SimplexLog, SolverError> {
    let mut tableau = cm.tableau.clone();
    let mut basis = cm.basis.clone();
    let n = cm.total_columns();

    let mut log = SimplexLog::new(cm.variable_names.clone(), cm.c_full.clone(), cm.m, n, cm.original_sense);
    log.record_iteration(&tableau, &basis, None, None);

    let mut iterations = 0usize;
    let optimal = loop {
        if iterations >= config.simplex_max_iterations {
            break false;
        }

        let Some(entering) = find_entering(&tableau, cm.m, n, config.eps_redcost) else {
            break true;
        };

        let Some(leaving) = find_leaving(&tableau, cm.m, entering, n, config.eps_pivot) else {
            return Err(SolverError::Unbounded(Box::new(log)));
        };

        pivot(&mut tableau, &mut basis, leaving, entering, config.eps_pivot);
        iterations += 1;
        log.record_iteration(&tableau, &basis, Some(entering), Some(leaving));
        tracing::trace!(iteration = iterations, entering, leaving, z = tableau[cm.m][n], "simplex pivot");
    };

    if !optimal {
        return Err(SolverError::IterationLimit { iterations, log: Box::new(log) });
    }

    if has_positive_artificial(cm, &tableau, &basis, n, config.eps_feas) {
        return Err(SolverError::Infeasible(Box::new(log)));
    }

    Ok(log)
}

/// Lowest-index column with a positive reduced cost (Bland's rule).
fn find_entering(tableau: &[Vec<f64>], m: usize, n: usize, eps_redcost: f64) -> Option<usize> {
    (0..n).find(|&j| tableau[m][j] > eps_redcost)
}

/// Minimum-ratio test over rows with a positive coefficient in `entering`,
/// ties broken by lowest row index.
fn find_leaving(tableau: &[Vec<f64>], m: usize, entering: usize, n: usize, eps_pivot: f64) -> Option<usize> {
    let rhs_col = n;
    let mut best: Option<(usize, f64)> = None;
    for i in 0..m {
        let coeff = tableau[i][entering];
        if coeff > eps_pivot {
            let ratio = tableau[i][rhs_col] / coeff;
            match best {
                None => best = Some((i, ratio)),
                Some((_, best_ratio)) => {
                    if ratio < best_ratio - eps_pivot {
                        best = Some((i, ratio));
                    }
                }
            }
        }
    }
    best.map(|(row, _)| row)
}

pub(crate) fn pivot(tableau: &mut [Vec<f64>], basis: &mut [usize], row: usize, col: usize, eps_pivot: f64) {
    let n_cols = tableau[0].len();
    let n_rows = tableau.len();
    let obj_row = n_rows - 1;
    let rhs_col = n_cols - 1;

    let pivot_val = tableau[row][col];
    for j in 0..n_cols {
        tableau[row][j] /= pivot_val;
    }

    for i in 0..n_rows {
        if i == row {
            continue;
        }
        let factor = tableau[i][col];
        if factor.abs() <= eps_pivot {
            continue;
        }
        for j in 0..n_cols {
            if i == obj_row && j == rhs_col {
                // This cell tracks +Z directly (§4.1 step 6, §8 Property 3),
                // the opposite sign of every other objective-row cell, which
                // tracks the reduced cost c_j - y.A_j. Eliminating it with
                // the same subtraction the other cells use would instead
                // accumulate -Z, decreasing every iteration.
                tableau[i][j] += factor * tableau[row][j];
            } else {
                tableau[i][j] -= factor * tableau[row][j];
            }
        }
    }

    basis[row] = col;
}

fn has_positive_artificial(cm: &CanonicalModel, tableau: &[Vec<f64>], basis: &[usize], n: usize, eps_feas: f64) -> bool {
    let artificial_start = cm.n_decision + cm.n_slack;
    let rhs_col = n;
    basis
        .iter()
        .enumerate()
        .any(|(row, &col)| col >= artificial_start && tableau[row][rhs_col] > eps_feas)
}
