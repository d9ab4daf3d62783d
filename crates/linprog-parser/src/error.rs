use thiserror::Error;

/// Errors produced while tokenising/parsing the §6 input grammar.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrammarError {
    #[error("expected at least a sense line and a sign-restriction line, found {found} non-blank line(s)")]
    TooFewLines { found: usize },

    #[error("line 1 must start with 'max' or 'min', found {found:?}")]
    InvalidSense { found: String },

    #[error("sense line has no objective coefficients")]
    EmptyObjective,

    #[error("expected {expected} numeric coefficients on constraint line {line}, found {found}")]
    WrongCoefficientCount { line: usize, expected: usize, found: usize },

    #[error("expected a relation token (<=, >=, =) on constraint line {line}, found {found:?}")]
    UnknownRelation { line: usize, found: String },

    #[error("expected a right-hand-side number on constraint line {line}")]
    MissingRhs { line: usize },

    #[error("expected {expected} sign-restriction tokens, found {found}")]
    WrongSignCount { expected: usize, found: usize },

    #[error("unknown sign-restriction token {found:?} (expected one of +, -, urs, int, bin)")]
    UnknownSignToken { found: String },

    #[error("invalid numeric token {text:?}")]
    InvalidNumber { text: String },
}
