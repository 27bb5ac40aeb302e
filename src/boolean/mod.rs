//! Cell functions in liberty syntax (`!`, `*`, `+`) and the keyword form
//! they are evaluated in.

mod expr;
mod sensitivity;

pub use expr::Expr;
pub use sensitivity::{generate_sensitive_vectors, SensitivityVector};

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Variable name to logic level. Iterates in alphabetical order, the same
/// order [`extract_variables`] returns.
pub type Assignment = BTreeMap<String, bool>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("cannot parse boolean expression {expression:?}: {reason}")]
    Syntax { expression: String, reason: String },
    #[error("unknown variable {0:?} in boolean expression")]
    UnknownVariable(String),
}

/// Rewrites liberty operators into keywords. Plain text substitution; a
/// malformed function only fails once it is parsed.
pub fn translate(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() * 2);
    for c in expr.chars() {
        match c {
            '!' => out.push_str("not "),
            '+' | '|' => out.push_str(" or "),
            '*' | '&' => out.push_str(" and "),
            '^' => out.push_str(" xor "),
            _ => out.push(c),
        }
    }
    out
}

/// Sorted, deduplicated identifiers (`[A-Za-z_]\w*`) of an untranslated
/// function. The order fixes which bit of an enumerated assignment belongs
/// to which variable.
pub fn extract_variables(expr: &str) -> Vec<String> {
    let cleaned: String = expr
        .chars()
        .map(|c| match c {
            '+' | '-' | '*' | '/' | '^' | '~' | '!' | '(' | ')' | '&' | '|' | '\'' => ' ',
            _ => c,
        })
        .collect();

    cleaned
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| {
            word.chars()
                .next()
                .map_or(false, |c| c.is_alphabetic() || c == '_')
        })
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parses a translated expression and evaluates it once.
pub fn evaluate(expr: &str, assignment: &Assignment) -> Result<bool, EvaluationError> {
    Expr::parse(expr)?.eval(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        assert_eq!(translate("A*!B+C"), "A and not B or C");
        assert_eq!(translate("!(A^B)"), "not (A xor B)");
    }

    #[test]
    fn test_translate_then_evaluate() {
        let assignment: Assignment = [("A", true), ("B", false), ("C", false)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        assert_eq!(evaluate(&translate("A*!B+C"), &assignment), Ok(true));
    }

    #[test]
    fn test_extract_variables() {
        assert_eq!(extract_variables("(B*A)+!B"), vec!["A", "B"]);
        assert_eq!(
            extract_variables("IN1*data_ready+!CLK"),
            vec!["CLK", "IN1", "data_ready"]
        );
        assert_eq!(extract_variables("A*1"), vec!["A"]);
        assert!(extract_variables("1").is_empty());
    }

    #[test]
    fn test_extract_variables_is_stable() {
        let expr = "S0*!S1*D2 + (S1*D1) + !S0*D0";
        let first = extract_variables(expr);
        for _ in 0..10 {
            assert_eq!(extract_variables(expr), first);
        }
        let mut sorted = first.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, first);
    }

    #[test]
    fn test_evaluate_reports_errors() {
        let assignment = Assignment::new();
        assert!(matches!(
            evaluate("A and", &assignment),
            Err(EvaluationError::Syntax { .. })
        ));
        assert_eq!(
            evaluate("A", &assignment),
            Err(EvaluationError::UnknownVariable("A".into()))
        );
    }
}
