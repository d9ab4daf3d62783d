use linprog_parser::{ParsedModel, Relation, Sense};

use crate::config::SolverConfig;
use crate::error::SolverError;

#[derive(Debug, Clone)]
struct Item {
    original_index: usize,
    weight: f64,
    profit: f64,
    ratio: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum KnapsackNodeStatus {
    /// Total weight exceeds capacity; dead end.
    Infeasible,
    /// Bound does not strictly exceed the current best profit.
    Pruned,
    /// All items decided; a feasible candidate.
    Complete,
    /// Bound survived; branched into include/exclude children.
    Branched,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct KnapsackNode {
    pub id: usize,
    pub parent_id: Option<usize>,
    pub status: KnapsackNodeStatus,
    pub weight: f64,
    pub profit: f64,
    pub bound: Option<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct KnapsackResult {
    pub best_profit: f64,
    /// 1-based original item indices, ascending.
    pub best_items: Vec<usize>,
    pub nodes: Vec<KnapsackNode>,
}

struct Frame {
    level: usize,
    weight: f64,
    profit: f64,
    taken: Vec<usize>,
    parent_id: Option<usize>,
}

/// Standalone 0/1-knapsack branch-and-bound (§4.6). Bypasses the simplex
/// entirely: the model's first constraint supplies item weights and
/// capacity, the objective supplies profits.
pub fn solve(parsed: &ParsedModel, config: &SolverConfig) -> Result<KnapsackResult, SolverError> {
    if parsed.sense != Sense::Maximize {
        return Err(SolverError::Domain("knapsack requires a maximize model".to_string()));
    }
    let Some(first) = parsed.constraints.first() else {
        return Err(SolverError::Domain("knapsack requires at least one constraint".to_string()));
    };
    if first.relation != Relation::LessEqual {
        return Err(SolverError::Domain(
            "knapsack requires a <= capacity constraint as the first constraint".to_string(),
        ));
    }

    let n0 = parsed.n_decision();
    let capacity = first.rhs.floor();

    let mut items: Vec<Item> = (0..n0)
        .map(|j| {
            let weight = first.coefficients[j];
            let profit = parsed.objective[j];
            let ratio = if weight > 0.0 { profit / weight } else { f64::INFINITY };
            Item { original_index: j, weight, profit, ratio }
        })
        .collect();
    items.sort_by(|a, b| b.ratio.partial_cmp(&a.ratio).unwrap_or(std::cmp::Ordering::Equal));

    let mut nodes: Vec<KnapsackNode> = Vec::new();
    let mut best_profit = 0.0_f64;
    let mut best_items: Vec<usize> = Vec::new();

    let mut stack = vec![Frame { level: 0, weight: 0.0, profit: 0.0, taken: Vec::new(), parent_id: None }];

    while let Some(frame) = stack.pop() {
        let node_id = nodes.len();

        if frame.weight > capacity + config.eps_feas {
            nodes.push(KnapsackNode {
                id: node_id,
                parent_id: frame.parent_id,
                status: KnapsackNodeStatus::Infeasible,
                weight: frame.weight,
                profit: frame.profit,
                bound: None,
            });
            continue;
        }

        if frame.level == items.len() {
            if frame.profit > best_profit + config.eps_feas {
                best_profit = frame.profit;
                best_items = frame.taken.clone();
            }
            nodes.push(KnapsackNode {
                id: node_id,
                parent_id: frame.parent_id,
                status: KnapsackNodeStatus::Complete,
                weight: frame.weight,
                profit: frame.profit,
                bound: None,
            });
            continue;
        }

        let bound = fractional_bound(&items, frame.level, capacity, frame.weight, frame.profit);
        if bound <= best_profit + config.eps_feas {
            nodes.push(KnapsackNode {
                id: node_id,
                parent_id: frame.parent_id,
                status: KnapsackNodeStatus::Pruned,
                weight: frame.weight,
                profit: frame.profit,
                bound: Some(bound),
            });
            continue;
        }

        nodes.push(KnapsackNode {
            id: node_id,
            parent_id: frame.parent_id,
            status: KnapsackNodeStatus::Branched,
            weight: frame.weight,
            profit: frame.profit,
            bound: Some(bound),
        });
        tracing::debug!(node_id, level = frame.level, bound, best_profit, "knapsack node");

        let item = &items[frame.level];

        // Exclude pushed first, include pushed last, so include pops first
        // (include-then-exclude branch order).
        stack.push(Frame {
            level: frame.level + 1,
            weight: frame.weight,
            profit: frame.profit,
            taken: frame.taken.clone(),
            parent_id: Some(node_id),
        });
        let mut include_taken = frame.taken;
        include_taken.push(item.original_index);
        stack.push(Frame {
            level: frame.level + 1,
            weight: frame.weight + item.weight,
            profit: frame.profit + item.profit,
            taken: include_taken,
            parent_id: Some(node_id),
        });
    }

    best_items.sort_unstable();
    let best_items = best_items.into_iter().map(|i| i + 1).collect();

    Ok(KnapsackResult { best_profit, best_items, nodes })
}

/// Greedy fill plus fractional top-up of the next item, an upper bound on
/// any completion of the items from `level` onward.
fn fractional_bound(items: &[Item], level: usize, capacity: f64, weight: f64, profit: f64) -> f64 {
    let mut total_weight = weight;
    let mut bound = profit;
    let mut i = level;
    while i < items.len() && total_weight + items[i].weight <= capacity {
        total_weight += items[i].weight;
        bound += items[i].profit;
        i += 1;
    }
    if i < items.len() {
        bound += (capacity - total_weight) * items[i].ratio;
    }
    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use linprog_parser::{ParsedConstraint, SignRestriction};

    #[test]
    fn test_s6_binary_knapsack() {
        let parsed = ParsedModel {
            sense: Sense::Maximize,
            objective: vec![60.0, 100.0, 120.0],
            constraints: vec![ParsedConstraint { coefficients: vec![10.0, 20.0, 30.0], relation: Relation::LessEqual, rhs: 50.0 }],
            signs: vec![SignRestriction::Binary; 3],
            variable_names: ParsedModel::default_names(3),
        };
        let cfg = SolverConfig::default();
        let result = solve(&parsed, &cfg).unwrap();
        assert!((result.best_profit - 220.0).abs() < 1e-6);
        assert_eq!(result.best_items, vec![2, 3]);
        assert!(!result.nodes.is_empty());
    }

    #[test]
    fn test_rejects_minimize() {
        let parsed = ParsedModel {
            sense: Sense::Minimize,
            objective: vec![1.0],
            constraints: vec![ParsedConstraint { coefficients: vec![1.0], relation: Relation::LessEqual, rhs: 1.0 }],
            signs: vec![SignRestriction::Binary],
            variable_names: ParsedModel::default_names(1),
        };
        let cfg = SolverConfig::default();
        let err = solve(&parsed, &cfg).unwrap_err();
        assert!(matches!(err, SolverError::Domain(_)));
    }

    #[test]
    fn test_rejects_non_le_first_constraint() {
        let parsed = ParsedModel {
            sense: Sense::Maximize,
            objective: vec![1.0],
            constraints: vec![ParsedConstraint { coefficients: vec![1.0], relation: Relation::GreaterEqual, rhs: 1.0 }],
            signs: vec![SignRestriction::Binary],
            variable_names: ParsedModel::default_names(1),
        };
        let cfg = SolverConfig::default();
        let err = solve(&parsed, &cfg).unwrap_err();
        assert!(matches!(err, SolverError::Domain(_)));
    }
}
