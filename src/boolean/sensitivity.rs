use std::fmt;

use super::{extract_variables, translate, Assignment, EvaluationError, Expr};

/// Enumeration is 2^n; standard cells stay far below this.
pub const MAX_VARIABLES: usize = 16;

/// An input assignment together with the one input whose flip toggles the
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitivityVector {
    pub assignment: Assignment,
    pub toggled: String,
}

impl SensitivityVector {
    /// Level of the toggled input before the flip. `false` means the
    /// stimulus is a rising edge.
    pub fn initial_level(&self) -> bool {
        self.assignment.get(&self.toggled).copied().unwrap_or(false)
    }

    pub fn flipped(&self) -> Assignment {
        let mut flipped = self.assignment.clone();
        if let Some(level) = flipped.get_mut(&self.toggled) {
            *level = !*level;
        }
        flipped
    }
}

impl fmt::Display for SensitivityVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, level) in &self.assignment {
            write!(f, "{name}={} ", u8::from(*level))?;
        }
        let edge = if self.initial_level() { "fall" } else { "rise" };
        write!(f, "-> {} {edge}", self.toggled)
    }
}

/// All (assignment, input) pairs of a liberty function where flipping that
/// single input changes the output.
///
/// Assignments are walked in increasing binary order with the first sorted
/// variable as the most significant bit; inputs are tried in sorted order.
/// Downstream file indices follow this order.
pub fn generate_sensitive_vectors(expr: &str) -> Result<Vec<SensitivityVector>, EvaluationError> {
    let variables = extract_variables(expr);
    let function = Expr::parse(&translate(expr))?;

    let n = variables.len();
    if n > MAX_VARIABLES {
        return Err(EvaluationError::Syntax {
            expression: expr.to_string(),
            reason: format!("{n} inputs exceed the enumeration limit of {MAX_VARIABLES}"),
        });
    }

    let mut vectors = Vec::new();
    for bits in 0..(1u32 << n) {
        let assignment: Assignment = variables
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), (bits >> (n - 1 - i)) & 1 == 1))
            .collect();
        let output = function.eval(&assignment)?;

        for name in &variables {
            let mut flipped = assignment.clone();
            if let Some(level) = flipped.get_mut(name) {
                *level = !*level;
            }
            if function.eval(&flipped)? != output {
                vectors.push(SensitivityVector {
                    assignment: assignment.clone(),
                    toggled: name.clone(),
                });
            }
        }
    }
    Ok(vectors)
}
