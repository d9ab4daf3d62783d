use crate::error::GrammarError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::model::{ParsedConstraint, ParsedModel, Relation, Sense, SignRestriction};

pub struct Parser;

impl Parser {
    /// Parse a complete source text into a [`ParsedModel`] per the §6 grammar:
    /// a sense line, zero or more constraint lines, and a trailing
    /// sign-restriction line.
    pub fn parse(source: &str) -> Result<ParsedModel, GrammarError> {
        let tokens = Lexer::tokenize(source);
        let lines = split_lines(&tokens);

        if lines.len() < 2 {
            return Err(GrammarError::TooFewLines { found: lines.len() });
        }

        let (sense, objective) = parse_sense_line(lines[0])?;
        if objective.is_empty() {
            return Err(GrammarError::EmptyObjective);
        }
        let n0 = objective.len();

        let sign_line = lines[lines.len() - 1];
        let signs = parse_sign_line(sign_line, n0)?;

        let mut constraints = Vec::with_capacity(lines.len() - 2);
        for (offset, line) in lines[1..lines.len() - 1].iter().enumerate() {
            constraints.push(parse_constraint_line(line, n0, offset + 2)?);
        }

        Ok(ParsedModel {
            sense,
            objective,
            constraints,
            signs,
            variable_names: ParsedModel::default_names(n0),
        })
    }
}

fn split_lines(tokens: &[Token]) -> Vec<&[Token]> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::Newline => {
                lines.push(&tokens[start..i]);
                start = i + 1;
            }
            TokenKind::Eof => {
                if i > start {
                    lines.push(&tokens[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    lines
}

fn parse_number(tok: &Token) -> Result<f64, GrammarError> {
    if tok.kind != TokenKind::Number {
        return Err(GrammarError::InvalidNumber { text: tok.text.clone() });
    }
    tok.text
        .parse::<f64>()
        .map_err(|_| GrammarError::InvalidNumber { text: tok.text.clone() })
}

fn parse_sense_line(line: &[Token]) -> Result<(Sense, Vec<f64>), GrammarError> {
    let Some(first) = line.first() else {
        return Err(GrammarError::InvalidSense { found: String::new() });
    };
    let sense = match first.kind {
        TokenKind::Max => Sense::Maximize,
        TokenKind::Min => Sense::Minimize,
        _ => return Err(GrammarError::InvalidSense { found: first.text.clone() }),
    };

    let mut objective = Vec::with_capacity(line.len() - 1);
    for tok in &line[1..] {
        objective.push(parse_number(tok)?);
    }
    Ok((sense, objective))
}

fn parse_constraint_line(line: &[Token], n0: usize, line_no: usize) -> Result<ParsedConstraint, GrammarError> {
    if line.len() < n0 + 1 {
        return Err(GrammarError::WrongCoefficientCount {
            line: line_no,
            expected: n0,
            found: line.len().saturating_sub(2),
        });
    }

    let mut coefficients = Vec::with_capacity(n0);
    for tok in &line[0..n0] {
        coefficients.push(parse_number(tok)?);
    }

    let relation = match line[n0].kind {
        TokenKind::LessEqual => Relation::LessEqual,
        TokenKind::GreaterEqual => Relation::GreaterEqual,
        TokenKind::Equal => Relation::Equal,
        _ => {
            return Err(GrammarError::UnknownRelation {
                line: line_no,
                found: line[n0].text.clone(),
            })
        }
    };

    let Some(rhs_tok) = line.get(n0 + 1) else {
        return Err(GrammarError::MissingRhs { line: line_no });
    };

    if line.len() != n0 + 2 {
        return Err(GrammarError::WrongCoefficientCount {
            line: line_no,
            expected: n0,
            found: line.len() - 2,
        });
    }

    let rhs = parse_number(rhs_tok)?;

    Ok(ParsedConstraint { coefficients, relation, rhs })
}

fn parse_sign_line(line: &[Token], n0: usize) -> Result<Vec<SignRestriction>, GrammarError> {
    if line.len() != n0 {
        return Err(GrammarError::WrongSignCount { expected: n0, found: line.len() });
    }

    let mut signs = Vec::with_capacity(n0);
    for tok in line {
        let sign = match tok.kind {
            TokenKind::Plus => SignRestriction::NonNeg,
            TokenKind::Minus => SignRestriction::NonPos,
            TokenKind::Urs => SignRestriction::Free,
            TokenKind::Int => SignRestriction::Integer,
            TokenKind::Bin => SignRestriction::Binary,
            _ => return Err(GrammarError::UnknownSignToken { found: tok.text.clone() }),
        };
        signs.push(sign);
    }
    Ok(signs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s1_bounded_max() {
        let src = "max +3 +5\n+1 +0 <= 4\n+0 +2 <= 12\n+3 +2 <= 18\n+ +\n";
        let model = Parser::parse(src).unwrap();
        assert_eq!(model.sense, Sense::Maximize);
        assert_eq!(model.objective, vec![3.0, 5.0]);
        assert_eq!(model.constraints.len(), 3);
        assert_eq!(model.signs, vec![SignRestriction::NonNeg, SignRestriction::NonNeg]);
        assert_eq!(model.constraints[2].rhs, 18.0);
        assert_eq!(model.constraints[1].relation, Relation::LessEqual);
    }

    #[test]
    fn test_s2_infeasible_dimensions_still_parse() {
        let src = "max +1 +1\n+1 +1 <= 1\n+1 +1 >= 3\n+ +\n";
        let model = Parser::parse(src).unwrap();
        assert_eq!(model.constraints.len(), 2);
        assert_eq!(model.constraints[1].relation, Relation::GreaterEqual);
    }

    #[test]
    fn test_s3_unbounded_dimensions_still_parse() {
        let src = "max +1 +0\n-1 +1 <= 1\n+ +\n";
        let model = Parser::parse(src).unwrap();
        assert_eq!(model.objective, vec![1.0, 0.0]);
        assert_eq!(model.constraints[0].coefficients, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_s4_equality() {
        let src = "min +2 +3\n+1 +1 = 10\n+ +\n";
        let model = Parser::parse(src).unwrap();
        assert_eq!(model.sense, Sense::Minimize);
        assert_eq!(model.constraints[0].relation, Relation::Equal);
    }

    #[test]
    fn test_s5_integer_signs() {
        let src = "max +5 +4\n+6 +4 <= 24\n+1 +2 <= 6\nint int\n";
        let model = Parser::parse(src).unwrap();
        assert_eq!(model.signs, vec![SignRestriction::Integer, SignRestriction::Integer]);
    }

    #[test]
    fn test_s6_binary_signs() {
        let src = "max +60 +100 +120\n+10 +20 +30 <= 50\nbin bin bin\n";
        let model = Parser::parse(src).unwrap();
        assert_eq!(model.signs, vec![SignRestriction::Binary; 3]);
    }

    #[test]
    fn test_too_few_lines() {
        let err = Parser::parse("max +1\n").unwrap_err();
        assert_eq!(err, GrammarError::TooFewLines { found: 1 });
    }

    #[test]
    fn test_missing_sense() {
        let err = Parser::parse("+1 +1\n+ +\n").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidSense { .. }));
    }

    #[test]
    fn test_wrong_sign_count() {
        let err = Parser::parse("max +1 +1\n+1 +1 <= 4\n+\n").unwrap_err();
        assert_eq!(err, GrammarError::WrongSignCount { expected: 2, found: 1 });
    }

    #[test]
    fn test_unknown_relation() {
        let err = Parser::parse("max +1 +1\n+1 +1 ~ 4\n+ +\n").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownRelation { .. }));
    }

    #[test]
    fn test_unknown_sign_token() {
        let err = Parser::parse("max +1 +1\n+1 +1 <= 4\n+ zzz\n").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownSignToken { .. }));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let src = "max +1 +1\n\n+1 +1 <= 4\n\n+ +\n";
        let model = Parser::parse(src).unwrap();
        assert_eq!(model.constraints.len(), 1);
    }
}
