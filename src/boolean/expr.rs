//! Parser and evaluator for the keyword form of a cell function
//! (`A and not B or C`), as produced by [`super::translate`].

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, satisfy},
    combinator::{all_consuming, map, not, recognize, value, verify},
    multi::{many0, many0_count},
    sequence::{delimited, pair, preceded, terminated},
    IResult, Parser,
};

use super::{Assignment, EvaluationError};

const KEYWORDS: [&str; 8] = ["not", "and", "or", "xor", "True", "False", "0", "1"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(bool),
    Var(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn parse(expression: &str) -> Result<Expr, EvaluationError> {
        match all_consuming(or_expr).parse(expression) {
            Ok((_, expr)) => Ok(expr),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let reason = if e.input.trim().is_empty() {
                    "unexpected end of expression".to_string()
                } else {
                    format!("unexpected input at {:?}", e.input.trim())
                };
                Err(EvaluationError::Syntax {
                    expression: expression.to_string(),
                    reason,
                })
            }
            Err(nom::Err::Incomplete(_)) => Err(EvaluationError::Syntax {
                expression: expression.to_string(),
                reason: "incomplete expression".to_string(),
            }),
        }
    }

    /// Evaluates against `assignment`. Only the assigned names resolve, and
    /// both operands are always evaluated so a bad name is never masked by
    /// short-circuiting.
    pub fn eval(&self, assignment: &Assignment) -> Result<bool, EvaluationError> {
        Ok(match self {
            Expr::Literal(b) => *b,
            Expr::Var(name) => *assignment
                .get(name)
                .ok_or_else(|| EvaluationError::UnknownVariable(name.clone()))?,
            Expr::Not(e) => !e.eval(assignment)?,
            Expr::And(a, b) => {
                let (a, b) = (a.eval(assignment)?, b.eval(assignment)?);
                a && b
            }
            Expr::Or(a, b) => {
                let (a, b) = (a.eval(assignment)?, b.eval(assignment)?);
                a || b
            }
            Expr::Xor(a, b) => a.eval(assignment)? ^ b.eval(assignment)?,
        })
    }
}

fn token<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: Parser<&'a str, O, nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    token(terminated(
        tag(word),
        not(satisfy(|c: char| c.is_alphanumeric() || c == '_')),
    ))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    token(verify(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )),
        |s: &str| !KEYWORDS.contains(&s),
    ))
    .parse(input)
}

fn literal(input: &str) -> IResult<&str, Expr> {
    alt((
        value(Expr::Literal(true), alt((keyword("True"), keyword("1")))),
        value(Expr::Literal(false), alt((keyword("False"), keyword("0")))),
    ))
    .parse(input)
}

fn atom(input: &str) -> IResult<&str, Expr> {
    alt((
        delimited(token(char('(')), or_expr, token(char(')'))),
        literal,
        map(identifier, |s| Expr::Var(s.to_string())),
    ))
    .parse(input)
}

fn not_expr(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(keyword("not"), not_expr), |e| Expr::Not(Box::new(e))),
        atom,
    ))
    .parse(input)
}

fn and_expr(input: &str) -> IResult<&str, Expr> {
    let (tail, (first, rest)) =
        pair(not_expr, many0(preceded(keyword("and"), not_expr))).parse(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |acc, e| Expr::And(Box::new(acc), Box::new(e)));
    Ok((tail, expr))
}

fn xor_expr(input: &str) -> IResult<&str, Expr> {
    let (tail, (first, rest)) =
        pair(and_expr, many0(preceded(keyword("xor"), and_expr))).parse(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |acc, e| Expr::Xor(Box::new(acc), Box::new(e)));
    Ok((tail, expr))
}

fn or_expr(input: &str) -> IResult<&str, Expr> {
    let (tail, (first, rest)) =
        pair(xor_expr, many0(preceded(keyword("or"), xor_expr))).parse(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |acc, e| Expr::Or(Box::new(acc), Box::new(e)));
    Ok((tail, expr))
}
