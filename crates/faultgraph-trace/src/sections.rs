//! Small line parsers shared by the trace-set and node-info formats.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_till1, take_while, take_while1},
    character::complete::{char as pchar, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_res},
    sequence::tuple,
    IResult,
};

/// `[ Key : Value ]` → `("Key", "Value")`, both trimmed.
pub(crate) fn parse_bracketed(line: &str) -> Option<(&str, &str)> {
    fn parser(input: &str) -> IResult<&str, (&str, &str)> {
        let (input, _) = multispace0(input)?;
        let (input, _) = pchar('[')(input)?;
        let (input, key) = take_while1(|c: char| c != ':' && c != ']')(input)?;
        let (input, _) = pchar(':')(input)?;
        let (input, value) = take_while(|c: char| c != ']')(input)?;
        let (input, _) = pchar(']')(input)?;
        let (input, _) = multispace0(input)?;
        Ok((input, (key.trim(), value.trim())))
    }

    let (key, value) = all_consuming(parser)(line).ok().map(|(_, kv)| kv)?;
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// `<function> <is_first> <line>` as written by `NodeInfoCollection::save`.
pub(crate) fn parse_node_info_line(line: &str) -> Result<(&str, bool, u32), String> {
    fn boolean(input: &str) -> IResult<&str, bool> {
        alt((
            map(tag_no_case("true"), |_| true),
            map(tag_no_case("false"), |_| false),
        ))(input)
    }

    fn parser(input: &str) -> IResult<&str, (&str, bool, u32)> {
        let (input, (_, function, _, is_first, _, line, _)) = tuple((
            multispace0,
            take_till1(char::is_whitespace),
            multispace1,
            boolean,
            multispace1,
            map_res(digit1, str::parse::<u32>),
            multispace0,
        ))(input)?;
        Ok((input, (function, is_first, line)))
    }

    all_consuming(parser)(line)
        .map(|(_, v)| v)
        .map_err(|_| "node info expects: `<function> <true|false> <line>`".to_string())
}
