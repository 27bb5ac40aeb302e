use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until},
    character::complete::{alpha1, alphanumeric1, char, multispace1, not_line_ending},
    combinator::{map, opt, recognize, value},
    error::{Error, ErrorKind, ParseError},
    multi::many0_count,
    sequence::{delimited, pair, tuple},
    IResult, Parser,
};

/// Whitespace, `/* */` and `//` comments, and `\` line continuations.
pub fn blank<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, (), E> {
    value(
        (),
        many0_count(alt((
            multispace1,
            recognize(tuple((tag("/*"), take_until("*/"), tag("*/")))),
            recognize(pair(tag("//"), not_line_ending)),
            tag("\\"),
        ))),
    )
    .parse(input)
}

pub fn ws<'a, F, O, E: ParseError<&'a str>>(inner: F) -> impl Parser<&'a str, O, E>
where
    F: Parser<&'a str, O, E>,
{
    delimited(blank, inner, blank)
}

#[test]
fn test_ws() {
    let input = "  123 /* skipped */ notseparatedabc \\\n def // trailing";
    let res = tuple((
        ws(tag::<&str, &str, ()>("123")),
        tag("not"),
        tag("separated"),
        ws(tag("abc")),
        ws(tag("def")),
    ))
    .parse(input);
    assert_eq!(
        res.unwrap(),
        ("", ("123", "not", "separated", "abc", "def"))
    );
}

/// Quoted string without the quotes. May span lines; may be empty.
pub fn qstring(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), map(opt(is_not("\"")), |s| s.unwrap_or("")), char('"')).parse(input)
}

pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// Text up to any of `stop` or the start of a comment, trimmed. The comment
/// is left for [`blank`].
fn bare_token<'a>(stop: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (_, raw) = is_not::<_, _, Error<&'a str>>(stop).parse(input)?;
        let end = [raw.find("/*"), raw.find("//")]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(raw.len());
        let token = raw[..end].trim();
        if token.is_empty() {
            return Err(nom::Err::Error(Error::new(input, ErrorKind::IsNot)));
        }
        Ok((&input[end..], token))
    }
}

/// Unquoted attribute value, running up to the terminating `;` or end of line.
pub fn bare_value(input: &str) -> IResult<&str, &str> {
    bare_token(";\n\r{}")(input)
}

/// Unquoted group or complex-attribute argument.
pub fn bare_argument(input: &str) -> IResult<&str, &str> {
    bare_token(",()\"\n\r")(input)
}
