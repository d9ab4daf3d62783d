#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEqual,
    GreaterEqual,
    Equal,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignRestriction {
    NonNeg,
    NonPos,
    Free,
    Integer,
    Binary,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ParsedConstraint {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

/// The output of `linprog-parser`: a model exactly as written by the user,
/// before any canonicalisation. Consumed by `linprog_core::canonical::build`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ParsedModel {
    pub sense: Sense,
    pub objective: Vec<f64>,
    pub constraints: Vec<ParsedConstraint>,
    pub signs: Vec<SignRestriction>,
    pub variable_names: Vec<String>,
}

impl ParsedModel {
    pub fn n_decision(&self) -> usize {
        self.objective.len()
    }

    /// Default `x1..xn` names, used when the grammar (which never names
    /// variables) is the only source of a model.
    pub fn default_names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("x{i}")).collect()
    }
}
