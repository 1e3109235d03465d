// Text grammars for field values and numeric arguments, built on nom

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take, take_while_m_n},
    character::complete::{char, digit1, hex_digit1, oct_digit1},
    combinator::{all_consuming, map_res, opt},
    multi::separated_list1,
    sequence::{preceded, separated_pair},
    IResult, Parser,
};

/// Textual parts of a date value: day, month abbreviation, year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateText<'a> {
    pub day: &'a str,
    pub month: &'a str,
    pub year: &'a str,
}

fn hex_pair(input: &str) -> IResult<&str, &str> {
    take_while_m_n(1, 2, |c: char| c.is_ascii_hexdigit()).parse(input)
}

/// Parse "X.Y" into its decimal digit strings
pub fn version(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(digit1, char('.'), digit1).parse(input)
}

/// Parse "DD/Mon/YYYY" into its parts; the month is any three characters
pub fn date(input: &str) -> IResult<&str, DateText<'_>> {
    let (input, (day, _, month, _, year)) =
        (digit1, char('/'), take(3usize), char('/'), digit1).parse(input)?;
    Ok((input, DateText { day, month, year }))
}

/// Parse colon-delimited groups of one or two hex digits
pub fn hex_groups(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(':'), hex_pair).parse(input)
}

fn hex_number(input: &str) -> IResult<&str, i64> {
    map_res(preceded(tag_no_case("0x"), hex_digit1), |s: &str| {
        i64::from_str_radix(s, 16)
    })
    .parse(input)
}

fn octal_number(input: &str) -> IResult<&str, i64> {
    map_res(preceded(char('0'), oct_digit1), |s: &str| {
        i64::from_str_radix(s, 8)
    })
    .parse(input)
}

fn decimal_number(input: &str) -> IResult<&str, i64> {
    map_res(digit1, |s: &str| s.parse::<i64>()).parse(input)
}

/// Parse an integer the way C's strtol does with base 0: optional minus sign,
/// then "0x" hex, leading-zero octal, or decimal
pub fn integer(input: &str) -> IResult<&str, i64> {
    let (input, (sign, magnitude)) = (
        opt(char('-')),
        alt((hex_number, octal_number, decimal_number)),
    )
        .parse(input)?;
    Ok((input, if sign.is_some() { -magnitude } else { magnitude }))
}

/// Parse a whole version string
pub fn parse_version(input: &str) -> Option<(&str, &str)> {
    all_consuming(version).parse(input).ok().map(|(_, v)| v)
}

/// Parse a whole date string
pub fn parse_date(input: &str) -> Option<DateText<'_>> {
    all_consuming(date).parse(input).ok().map(|(_, d)| d)
}

/// Parse a whole colon-delimited byte string
pub fn parse_delimited_bytes(input: &str) -> Option<Vec<u8>> {
    let (_, groups) = all_consuming(hex_groups).parse(input).ok()?;
    groups
        .into_iter()
        .map(|group| u8::from_str_radix(group, 16).ok())
        .collect()
}

/// Parse one or two hex digits into a byte
pub fn parse_hex_byte(input: &str) -> Option<u8> {
    all_consuming(hex_pair)
        .parse(input)
        .ok()
        .and_then(|(_, digits)| u8::from_str_radix(digits, 16).ok())
}

/// Parse a whole strtol-style integer
pub fn parse_integer(input: &str) -> Option<i64> {
    all_consuming(integer).parse(input).ok().map(|(_, n)| n)
}
