use linprog_parser::{ParsedModel, Relation, Sense, SignRestriction};

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::linalg;

/// How an original decision variable maps onto one or two canonical
/// tableau columns. Needed to translate a tableau solution back into a
/// value per user-facing variable once the solver has returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// NonNeg / Integer / Binary: the column is the variable, unchanged.
    Direct { col: usize },
    /// NonPos: the column holds `-x`.
    Negated { col: usize },
    /// Free: `x = x_pos - x_neg`, two NonNeg columns.
    Split { pos_col: usize, neg_col: usize },
}

/// The standard-form tableau produced by the canonical-form builder
/// (§4.1): a dense `(m+1) x (n+1)` matrix whose last row is the reduced-cost
/// row and whose last column is the RHS, plus the metadata needed to
/// interpret it.
#[derive(Debug, Clone)]
pub struct CanonicalModel {
    pub tableau: Vec<Vec<f64>>,
    pub basis: Vec<usize>,
    pub c_full: Vec<f64>,
    pub n_decision: usize,
    pub n_slack: usize,
    pub n_artificial: usize,
    pub m: usize,
    pub original_sense: Sense,
    pub big_m: f64,
    pub variable_names: Vec<String>,
    pub column_map: Vec<ColumnSource>,
    pub original_objective: Vec<f64>,
}

impl CanonicalModel {
    pub fn total_columns(&self) -> usize {
        self.n_decision + self.n_slack + self.n_artificial
    }

    /// Recover the value of original decision variable `j` from a solved
    /// tableau and its matching basis (typically the final pair in a solve
    /// log — `self.basis` only holds the *initial* basis and is not the
    /// right one to read values out of once the solver has pivoted).
    pub fn decision_value(&self, j: usize, tableau: &[Vec<f64>], basis: &[usize]) -> f64 {
        let column_value = |col: usize| -> f64 {
            basis
                .iter()
                .position(|&b| b == col)
                .map(|row| tableau[row][tableau[0].len() - 1])
                .unwrap_or(0.0)
        };
        match self.column_map[j] {
            ColumnSource::Direct { col } => column_value(col),
            ColumnSource::Negated { col } => -column_value(col),
            ColumnSource::Split { pos_col, neg_col } => column_value(pos_col) - column_value(neg_col),
        }
    }

    /// All original decision-variable values, in user-facing order.
    pub fn decision_values(&self, tableau: &[Vec<f64>], basis: &[usize]) -> Vec<f64> {
        (0..self.column_map.len()).map(|j| self.decision_value(j, tableau, basis)).collect()
    }

    /// The objective value, computed directly from decision-variable values
    /// against the original (untransformed) cost vector, rather than read
    /// off a tableau cell whose sign depends on solver-internal bookkeeping.
    pub fn report_objective(&self, tableau: &[Vec<f64>], basis: &[usize]) -> f64 {
        self.decision_values(tableau, basis)
            .iter()
            .zip(self.original_objective.iter())
            .map(|(v, c)| v * c)
            .sum()
    }
}

/// Translate a parsed model into a standard-form maximisation tableau with
/// a known basic-feasible starting point (§4.1).
pub fn build(parsed: &ParsedModel, config: &SolverConfig) -> Result<CanonicalModel, SolverError> {
    let n0 = parsed.objective.len();
    let m = parsed.constraints.len();

    // Step 1: sense normalisation.
    let cost_work: Vec<f64> = match parsed.sense {
        Sense::Maximize => parsed.objective.clone(),
        Sense::Minimize => parsed.objective.iter().map(|v| -v).collect(),
    };

    // Step 2: per-variable sign transforms produce the decision-like columns.
    let mut column_map = Vec::with_capacity(n0);
    let mut cost_decision: Vec<f64> = Vec::new();
    let mut a_decision: Vec<Vec<f64>> = vec![Vec::new(); m];
    let mut decision_names: Vec<String> = Vec::new();

    for j in 0..n0 {
        let name = &parsed.variable_names[j];
        match parsed.signs[j] {
            SignRestriction::NonNeg | SignRestriction::Integer | SignRestriction::Binary => {
                let col = cost_decision.len();
                column_map.push(ColumnSource::Direct { col });
                cost_decision.push(cost_work[j]);
                decision_names.push(name.clone());
                for i in 0..m {
                    a_decision[i].push(parsed.constraints[i].coefficients[j]);
                }
            }
            SignRestriction::NonPos => {
                let col = cost_decision.len();
                column_map.push(ColumnSource::Negated { col });
                cost_decision.push(-cost_work[j]);
                decision_names.push(format!("{name}_neg"));
                for i in 0..m {
                    a_decision[i].push(-parsed.constraints[i].coefficients[j]);
                }
            }
            SignRestriction::Free => {
                let pos_col = cost_decision.len();
                let neg_col = pos_col + 1;
                column_map.push(ColumnSource::Split { pos_col, neg_col });
                cost_decision.push(cost_work[j]);
                cost_decision.push(-cost_work[j]);
                decision_names.push(format!("{name}+"));
                decision_names.push(format!("{name}-"));
                for i in 0..m {
                    a_decision[i].push(parsed.constraints[i].coefficients[j]);
                    a_decision[i].push(-parsed.constraints[i].coefficients[j]);
                }
            }
        }
    }
    let n_decision = cost_decision.len();

    // Step 3: RHS normalisation.
    let mut b: Vec<f64> = parsed.constraints.iter().map(|c| c.rhs).collect();
    let mut relation: Vec<Relation> = parsed.constraints.iter().map(|c| c.relation).collect();
    for i in 0..m {
        if b[i] < 0.0 {
            b[i] = -b[i];
            for col in a_decision[i].iter_mut() {
                *col = -*col;
            }
            relation[i] = match relation[i] {
                Relation::LessEqual => Relation::GreaterEqual,
                Relation::GreaterEqual => Relation::LessEqual,
                Relation::Equal => Relation::Equal,
            };
        }
    }

    // Step 4: slack/artificial introduction per row.
    let mut n_slack = 0usize;
    let mut n_artificial = 0usize;
    for r in &relation {
        match r {
            Relation::LessEqual => n_slack += 1,
            Relation::GreaterEqual => {
                n_slack += 1;
                n_artificial += 1;
            }
            Relation::Equal => n_artificial += 1,
        }
    }

    let n = n_decision + n_slack + n_artificial;
    let mut tableau = vec![vec![0.0; n + 1]; m + 1];
    let mut basis = vec![0usize; m];

    let mut slack_col = n_decision;
    let mut artificial_col = n_decision + n_slack;

    for i in 0..m {
        for col in 0..n_decision {
            tableau[i][col] = a_decision[i][col];
        }
        tableau[i][n] = b[i];

        match relation[i] {
            Relation::LessEqual => {
                tableau[i][slack_col] = 1.0;
                basis[i] = slack_col;
                slack_col += 1;
            }
            Relation::GreaterEqual => {
                tableau[i][slack_col] = -1.0;
                slack_col += 1;
                tableau[i][artificial_col] = 1.0;
                basis[i] = artificial_col;
                artificial_col += 1;
            }
            Relation::Equal => {
                tableau[i][artificial_col] = 1.0;
                basis[i] = artificial_col;
                artificial_col += 1;
            }
        }
    }

    // Step 5: Big-M.
    let max_abs_c = cost_decision.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    let max_abs_b = b.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    let max_abs_a = a_decision
        .iter()
        .flat_map(|row| row.iter())
        .fold(1.0_f64, |acc, v| acc.max(v.abs()));
    let big_m = 1.0e6 * max_abs_c.max(max_abs_b).max(max_abs_a);

    let mut c_full = vec![0.0; n];
    c_full[0..n_decision].copy_from_slice(&cost_decision);
    for col in n_decision..(n_decision + n_slack) {
        c_full[col] = 0.0;
    }
    for col in (n_decision + n_slack)..n {
        c_full[col] = -big_m;
    }

    // Step 6: reduced-cost row from the initial basis inverse.
    let basis_matrix: Vec<Vec<f64>> = (0..m).map(|i| (0..m).map(|k| tableau[i][basis[k]]).collect()).collect();
    let inv = linalg::invert(&basis_matrix, config.eps_pivot)
        .map_err(|_| SolverError::Canonical("singular basis".to_string()))?;
    let c_b: Vec<f64> = basis.iter().map(|&col| c_full[col]).collect();
    let y = linalg::mat_vec_mul_transposed(&inv, &c_b);

    for j in 0..n {
        let a_j: Vec<f64> = (0..m).map(|i| tableau[i][j]).collect();
        let y_dot_a_j: f64 = y.iter().zip(a_j.iter()).map(|(yi, ai)| yi * ai).sum();
        tableau[m][j] = c_full[j] - y_dot_a_j;
    }
    // T[m, n] = y.b (§4.1 step 6), the running objective value under the
    // internal maximisation convention. The elimination in `pivot` treats
    // every column, including the RHS, the same way, so this entry tracks
    // `+Z` through every subsequent pivot exactly like a reduced-cost column
    // tracks `c_j - y.A_j`.
    let y_dot_b: f64 = y.iter().zip(b.iter()).map(|(yi, bi)| yi * bi).sum();
    tableau[m][n] = y_dot_b;

    let mut variable_names = decision_names;
    variable_names.extend((1..=n_slack).map(|i| format!("s{i}")));
    variable_names.extend((1..=n_artificial).map(|i| format!("a{i}")));

    tracing::debug!(
        n_decision,
        n_slack,
        n_artificial,
        big_m,
        "built canonical tableau"
    );

    Ok(CanonicalModel {
        tableau,
        basis,
        c_full,
        n_decision,
        n_slack,
        n_artificial,
        m,
        original_sense: parsed.sense,
        big_m,
        variable_names,
        column_map,
        original_objective: parsed.objective.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linprog_parser::ParsedConstraint;

    fn model(sense: Sense, objective: Vec<f64>, constraints: Vec<ParsedConstraint>, signs: Vec<SignRestriction>) -> ParsedModel {
        let n = objective.len();
        ParsedModel {
            sense,
            objective,
            constraints,
            signs,
            variable_names: ParsedModel::default_names(n),
        }
    }

    #[test]
    fn test_le_constraint_basis_is_slack() {
        let parsed = model(
            Sense::Maximize,
            vec![3.0, 5.0],
            vec![ParsedConstraint { coefficients: vec![1.0, 0.0], relation: Relation::LessEqual, rhs: 4.0 }],
            vec![SignRestriction::NonNeg, SignRestriction::NonNeg],
        );
        let cm = build(&parsed, &SolverConfig::default()).unwrap();
        assert_eq!(cm.n_decision, 2);
        assert_eq!(cm.n_slack, 1);
        assert_eq!(cm.n_artificial, 0);
        assert_eq!(cm.basis, vec![2]);
        // Reduced-cost row for a slack-only basis matches cost_work directly.
        assert_eq!(cm.tableau[cm.m][0], 3.0);
        assert_eq!(cm.tableau[cm.m][1], 5.0);
    }

    #[test]
    fn test_equality_gets_artificial_and_big_m_cost() {
        let parsed = model(
            Sense::Minimize,
            vec![2.0, 3.0],
            vec![ParsedConstraint { coefficients: vec![1.0, 1.0], relation: Relation::Equal, rhs: 10.0 }],
            vec![SignRestriction::NonNeg, SignRestriction::NonNeg],
        );
        let cm = build(&parsed, &SolverConfig::default()).unwrap();
        assert_eq!(cm.n_artificial, 1);
        assert_eq!(cm.basis, vec![2]);
        assert_eq!(cm.c_full[2], -cm.big_m);
    }

    #[test]
    fn test_ge_constraint_gets_slack_and_artificial() {
        let parsed = model(
            Sense::Maximize,
            vec![1.0, 1.0],
            vec![ParsedConstraint { coefficients: vec![1.0, 1.0], relation: Relation::GreaterEqual, rhs: 3.0 }],
            vec![SignRestriction::NonNeg, SignRestriction::NonNeg],
        );
        let cm = build(&parsed, &SolverConfig::default()).unwrap();
        assert_eq!(cm.n_slack, 1);
        assert_eq!(cm.n_artificial, 1);
        assert_eq!(cm.tableau[0][2], -1.0);
        assert_eq!(cm.tableau[0][3], 1.0);
        assert_eq!(cm.basis, vec![3]);
    }

    #[test]
    fn test_free_variable_splits_into_two_columns() {
        let parsed = model(
            Sense::Maximize,
            vec![1.0],
            vec![ParsedConstraint { coefficients: vec![1.0], relation: Relation::LessEqual, rhs: 5.0 }],
            vec![SignRestriction::Free],
        );
        let cm = build(&parsed, &SolverConfig::default()).unwrap();
        assert_eq!(cm.n_decision, 2);
        assert!(matches!(cm.column_map[0], ColumnSource::Split { pos_col: 0, neg_col: 1 }));
    }

    #[test]
    fn test_nonpos_variable_negates_column() {
        let parsed = model(
            Sense::Maximize,
            vec![3.0],
            vec![ParsedConstraint { coefficients: vec![2.0], relation: Relation::LessEqual, rhs: 5.0 }],
            vec![SignRestriction::NonPos],
        );
        let cm = build(&parsed, &SolverConfig::default()).unwrap();
        assert_eq!(cm.tableau[0][0], -2.0);
        assert_eq!(cm.c_full[0], -3.0);
    }

    #[test]
    fn test_negative_rhs_flips_relation() {
        let parsed = model(
            Sense::Maximize,
            vec![1.0],
            vec![ParsedConstraint { coefficients: vec![1.0], relation: Relation::LessEqual, rhs: -4.0 }],
            vec![SignRestriction::NonNeg],
        );
        let cm = build(&parsed, &SolverConfig::default()).unwrap();
        assert_eq!(cm.tableau[0][cm.tableau[0].len() - 1], 4.0);
        // flipped to >=, so the slack coefficient should be -1, and an artificial should exist.
        assert_eq!(cm.n_artificial, 1);
        assert_eq!(cm.tableau[0][1], -1.0);
    }
}
