use linprog_parser::{ParsedConstraint, ParsedModel, Relation, SignRestriction};

use crate::canonical;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::log::SimplexLog;
use crate::simplex;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct CuttingPlaneIteration {
    pub objective: f64,
    pub values: Vec<f64>,
    pub cut_variable: Option<usize>,
    pub cut_rhs: Option<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct CuttingPlaneResult {
    pub objective: f64,
    pub values: Vec<f64>,
    pub iterations: Vec<CuttingPlaneIteration>,
}

/// Simplified Gomory cutting-plane driver (§4.5). Each round adds a weak
/// rounding cut `x_j <= floor(x_j*)` on the most-fractional integer
/// variable and re-canonicalises; there is no real Gomory fractional-row
/// cut here, matching the project's documented simplification.
pub fn solve(parsed: &ParsedModel, config: &SolverConfig) -> Result<CuttingPlaneResult, SolverError> {
    let n0 = parsed.n_decision();
    let integer_vars: Vec<usize> = (0..n0)
        .filter(|&j| matches!(parsed.signs[j], SignRestriction::Integer | SignRestriction::Binary))
        .collect();

    let mut model = parsed.clone();
    let mut iterations = Vec::new();

    for round in 0..config.cutting_plane_cap {
        let cm = canonical::build(&model, config)?;
        let log: SimplexLog = simplex::solve(&cm, config)?;
        let objective = cm.report_objective(log.final_tableau(), log.final_basis());
        let values = cm.decision_values(log.final_tableau(), log.final_basis());

        let fractional = integer_vars
            .iter()
            .copied()
            .map(|j| (j, (values[j] - values[j].round()).abs()))
            .filter(|&(_, frac)| frac > config.eps_feas)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let Some((cut_var, _)) = fractional else {
            iterations.push(CuttingPlaneIteration { objective, values: values.clone(), cut_variable: None, cut_rhs: None });
            tracing::debug!(round, objective, "cutting plane converged to an integer solution");
            return Ok(CuttingPlaneResult { objective, values, iterations });
        };

        let cut_rhs = values[cut_var].floor();
        iterations.push(CuttingPlaneIteration {
            objective,
            values: values.clone(),
            cut_variable: Some(cut_var),
            cut_rhs: Some(cut_rhs),
        });
        tracing::debug!(round, cut_var, cut_rhs, "cutting plane added rounding cut");

        let mut coefficients = vec![0.0; n0];
        coefficients[cut_var] = 1.0;
        model.constraints.push(ParsedConstraint { coefficients, relation: Relation::LessEqual, rhs: cut_rhs });
    }

    let cm = canonical::build(&model, config)?;
    let log = simplex::solve(&cm, config)?;
    Err(SolverError::IterationLimit { iterations: config.cutting_plane_cap, log: Box::new(log) })
}
