//! Literal parser for structured job parameters
//!
//! Job files carry structured values written as Python-flavoured literals:
//!
//! ```text
//! intensity_measure_types_and_levels = {'PGA': [0.1, 0.2], "SA(0.1)": [0.1, 0.4]}
//! maximum_distance = {'Active Shallow Crust': 200, 'default': 100}
//! iml_disagg = {'PGV': 0.1}
//! ```
//!
//! Both quote styles are accepted, as are `None`/`null` and
//! `True`/`False`/`true`/`false`. Dict entries keep their written order.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, multispace0},
    combinator::{all_consuming, cut, map, opt, value},
    error::{context, ContextError, ParseError as NomParseError, VerboseError},
    multi::separated_list0,
    number::complete::double,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};

/// A parsed literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Number(f64),
    Str(String),
    /// `[...]` or `(...)`
    List(Vec<Literal>),
    /// `{key: value, ...}` in written order
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String content of a quoted literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::None => "None",
            Literal::Bool(_) => "bool",
            Literal::Number(_) => "number",
            Literal::Str(_) => "string",
            Literal::List(_) => "list",
            Literal::Dict(_) => "dict",
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Parse a complete literal; trailing input is an error
pub fn parse_literal(input: &str) -> Result<Literal, String> {
    match all_consuming(delimited(
        multispace0,
        literal::<VerboseError<&str>>,
        multispace0,
    ))(input)
    {
        Ok((_, lit)) => Ok(lit),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(nom::error::convert_error(input, e))
        }
        Err(nom::Err::Incomplete(_)) => Err("Incomplete input".to_string()),
    }
}

// ============================================================================
// Internal Parsers
// ============================================================================

fn literal<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Literal, E> {
    alt((
        value(Literal::None, alt((tag("None"), tag("null")))),
        value(Literal::Bool(true), alt((tag("True"), tag("true")))),
        value(Literal::Bool(false), alt((tag("False"), tag("false")))),
        map(quoted, Literal::Str),
        map(list, Literal::List),
        map(tuple_list, Literal::List),
        map(dict, Literal::Dict),
        map(double, Literal::Number),
    ))(input)
}

fn quoted<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, String, E> {
    map(
        alt((
            delimited(
                char('\''),
                take_while(|c| c != '\''),
                cut(context("closing quote", char('\''))),
            ),
            delimited(
                char('"'),
                take_while(|c| c != '"'),
                cut(context("closing quote", char('"'))),
            ),
        )),
        |s: &str| s.to_string(),
    )(input)
}

fn comma<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, char, E> {
    delimited(multispace0, char(','), multispace0)(input)
}

fn items<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Vec<Literal>, E> {
    terminated(
        separated_list0(comma, literal),
        preceded(multispace0, opt(char(','))),
    )(input)
}

fn list<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Vec<Literal>, E> {
    delimited(
        terminated(char('['), multispace0),
        items,
        preceded(multispace0, cut(context("closing bracket", char(']')))),
    )(input)
}

fn tuple_list<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Vec<Literal>, E> {
    delimited(
        terminated(char('('), multispace0),
        items,
        preceded(multispace0, cut(context("closing parenthesis", char(')')))),
    )(input)
}

fn entry<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (Literal, Literal), E> {
    separated_pair(
        literal,
        delimited(multispace0, char(':'), multispace0),
        cut(context("dict value", literal)),
    )(input)
}

fn dict<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Vec<(Literal, Literal)>, E> {
    delimited(
        terminated(char('{'), multispace0),
        terminated(
            separated_list0(comma, entry),
            preceded(multispace0, opt(char(','))),
        ),
        preceded(multispace0, cut(context("closing brace", char('}')))),
    )(input)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(parse_literal("400").unwrap(), Literal::Number(400.0));
        assert_eq!(parse_literal(" -1.5e-2 ").unwrap(), Literal::Number(-0.015));
        assert_eq!(parse_literal("None").unwrap(), Literal::None);
        assert_eq!(parse_literal("True").unwrap(), Literal::Bool(true));
        assert_eq!(
            parse_literal("'Active Shallow Crust'").unwrap(),
            Literal::Str("Active Shallow Crust".to_string())
        );
    }

    #[test]
    fn test_imtls_dict_keeps_order() {
        let lit = parse_literal("{'SA(0.1)': [0.1, 0.2], \"PGA\": [0.4, 0.4, 0.6]}").unwrap();
        let Literal::Dict(entries) = lit else {
            panic!("expected a dict");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0.as_str(), Some("SA(0.1)"));
        assert_eq!(entries[1].0.as_str(), Some("PGA"));
        assert_eq!(
            entries[1].1,
            Literal::List(vec![
                Literal::Number(0.4),
                Literal::Number(0.4),
                Literal::Number(0.6)
            ])
        );
    }

    #[test]
    fn test_trailing_commas_and_tuples() {
        assert_eq!(
            parse_literal("[1, 2,]").unwrap(),
            Literal::List(vec![Literal::Number(1.0), Literal::Number(2.0)])
        );
        assert_eq!(
            parse_literal("{'a': (5, 100),}").unwrap(),
            Literal::Dict(vec![(
                Literal::Str("a".to_string()),
                Literal::List(vec![Literal::Number(5.0), Literal::Number(100.0)])
            )])
        );
        assert_eq!(parse_literal("{}").unwrap(), Literal::Dict(vec![]));
    }

    #[test]
    fn test_errors() {
        assert!(parse_literal("{'PGA': [0.1, 0.2}").is_err());
        assert!(parse_literal("'unterminated").is_err());
        assert!(parse_literal("[1, 2] extra").is_err());
        assert!(parse_literal("").is_err());
    }
}
