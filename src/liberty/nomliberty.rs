use super::{
    group::{Attribute, AttributeValue, Group, Value},
    nomutil::{bare_argument, bare_value, blank, identifier, qstring, ws},
};
use color_eyre::{eyre::eyre, Report};
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{all_consuming, map, opt},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
    IResult, Parser,
};

enum Statement {
    Group(Group),
    Attribute(Attribute),
}

fn argument(input: &str) -> IResult<&str, Value> {
    alt((
        map(qstring, |s| Value::Text(s.to_string())),
        map(bare_argument, Value::from_token),
    ))
    .parse(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<Value>> {
    delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), ws(argument)),
        ws(char(')')),
    )
    .parse(input)
}

fn simple_attribute(input: &str) -> IResult<&str, Attribute> {
    let (tail, (name, value)) = terminated(
        separated_pair(
            ws(identifier),
            char(':'),
            ws(alt((
                map(qstring, |s| Value::Text(s.to_string())),
                map(bare_value, Value::from_token),
            ))),
        ),
        opt(ws(char(';'))),
    )
    .parse(input)?;

    Ok((
        tail,
        Attribute {
            name: name.to_string(),
            value: AttributeValue::Simple(value),
        },
    ))
}

fn complex_attribute(input: &str) -> IResult<&str, Attribute> {
    let (tail, (name, values)) =
        terminated(pair(ws(identifier), arguments), opt(ws(char(';')))).parse(input)?;

    Ok((
        tail,
        Attribute {
            name: name.to_string(),
            value: AttributeValue::Complex(values),
        },
    ))
}

fn statement(input: &str) -> IResult<&str, Statement> {
    alt((
        map(group, Statement::Group),
        map(simple_attribute, Statement::Attribute),
        map(complex_attribute, Statement::Attribute),
    ))
    .parse(input)
}

pub fn group(input: &str) -> IResult<&str, Group> {
    let (tail, (kind, args)) = pair(ws(identifier), arguments).parse(input)?;
    let (tail, statements) =
        delimited(ws(char('{')), many0(statement), ws(char('}'))).parse(tail)?;

    let mut group = Group {
        kind: kind.to_string(),
        args,
        ..Default::default()
    };
    for statement in statements {
        match statement {
            Statement::Group(g) => group.groups.push(g),
            Statement::Attribute(a) => group.attributes.push(a),
        }
    }
    Ok((tail, group))
}

/// Parses a complete liberty source into its top-level group.
pub fn parse_liberty(input: &str) -> Result<Group, Report> {
    let result = all_consuming(delimited(blank, group, blank)).parse(input);
    match result {
        Ok((_, group)) => Ok(group),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = input.len() - e.input.len();
            let line = input[..offset].matches('\n').count() + 1;
            let snippet: String = e.input.chars().take(40).collect();
            Err(eyre!(
                "liberty syntax error at line {line} ({:?}) near {snippet:?}",
                e.code
            ))
        }
        Err(nom::Err::Incomplete(_)) => Err(eyre!("liberty input ended unexpectedly")),
    }
}
