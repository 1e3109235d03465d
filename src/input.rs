// Parsing of change requests given on the command line or stdin

use crate::field::parser::parse_integer;
use crate::layout::{ByteChange, ByteRange, FieldChange};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid field change \"{0}\", expected KEY=VALUE")]
    FieldChange(String),

    #[error("Invalid byte change \"{0}\", expected OFFSET[-OFFSET],VALUE")]
    ByteChange(String),

    #[error("Invalid byte range \"{0}\", expected OFFSET[-OFFSET]")]
    ByteRange(String),

    #[error("Invalid number \"{number}\" in \"{token}\"")]
    Number { token: String, number: String },
}

pub type Result<T> = std::result::Result<T, InputError>;

lazy_static! {
    static ref BYTE_CHANGE: Regex = Regex::new(r"^(\w+)(?:-(\w+))?,(-?\w+)$").unwrap();
    static ref BYTE_RANGE: Regex = Regex::new(r"^(\w+)(?:-(\w+))?$").unwrap();
}

fn number(token: &str, text: &str) -> Result<i64> {
    parse_integer(text).ok_or_else(|| InputError::Number {
        token: token.to_string(),
        number: text.to_string(),
    })
}

/// "KEY=VALUE", split at the first '='. An empty value clears the field.
pub fn parse_field_change(token: &str) -> Result<FieldChange> {
    match token.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(FieldChange::new(key, value)),
        _ => Err(InputError::FieldChange(token.to_string())),
    }
}

/// "OFFSET[-OFFSET],VALUE" with C-style hex, octal or decimal numbers
pub fn parse_byte_change(token: &str) -> Result<ByteChange> {
    let caps = BYTE_CHANGE
        .captures(token)
        .ok_or_else(|| InputError::ByteChange(token.to_string()))?;

    let start = number(token, &caps[1])?;
    let end = match caps.get(2) {
        Some(end) => number(token, end.as_str())?,
        None => start,
    };
    let value = number(token, &caps[3])?;

    Ok(ByteChange::new(start, end, value))
}

/// "OFFSET[-OFFSET]"
pub fn parse_byte_range(token: &str) -> Result<ByteRange> {
    let caps = BYTE_RANGE
        .captures(token)
        .ok_or_else(|| InputError::ByteRange(token.to_string()))?;

    let start = number(token, &caps[1])?;
    let end = match caps.get(2) {
        Some(end) => number(token, end.as_str())?,
        None => start,
    };

    Ok(ByteRange::new(start, end))
}

/// Split change text read from stdin into tokens, one per non-empty line
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse every token with @parse, stopping at the first malformed one
pub fn parse_all<T, S: AsRef<str>>(tokens: &[S], parse: fn(&str) -> Result<T>) -> Result<Vec<T>> {
    tokens.iter().map(|token| parse(token.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_change() {
        assert_eq!(
            parse_field_change("serial_number=AB12").unwrap(),
            FieldChange::new("serial_number", "AB12")
        );
        assert_eq!(
            parse_field_change("date=a=b").unwrap(),
            FieldChange::new("date", "a=b")
        );
        assert_eq!(
            parse_field_change("mac_address=").unwrap(),
            FieldChange::new("mac_address", "")
        );
        assert!(matches!(
            parse_field_change("=value"),
            Err(InputError::FieldChange(_))
        ));
        assert!(parse_field_change("no_separator").is_err());
    }

    #[test]
    fn test_byte_change() {
        assert_eq!(
            parse_byte_change("5,0x12").unwrap(),
            ByteChange::single(5, 0x12)
        );
        assert_eq!(
            parse_byte_change("0x10-0x1f,255").unwrap(),
            ByteChange::new(16, 31, 255)
        );
        assert_eq!(
            parse_byte_change("010,-1").unwrap(),
            ByteChange::single(8, -1)
        );
        assert!(matches!(
            parse_byte_change("5"),
            Err(InputError::ByteChange(_))
        ));
        assert!(matches!(
            parse_byte_change("5,zz"),
            Err(InputError::Number { .. })
        ));
        assert!(parse_byte_change("1-2-3,4").is_err());
    }

    #[test]
    fn test_byte_range() {
        assert_eq!(parse_byte_range("0x2c").unwrap(), ByteRange::single(44));
        assert_eq!(parse_byte_range("0-9").unwrap(), ByteRange::new(0, 9));
        assert!(matches!(
            parse_byte_range("0,1"),
            Err(InputError::ByteRange(_))
        ));
        assert!(matches!(
            parse_byte_range("0x"),
            Err(InputError::Number { .. })
        ));
    }

    #[test]
    fn test_split_lines() {
        let lines = split_lines("a=1\n\nb=2\r\n\n");
        assert_eq!(lines, vec!["a=1".to_string(), "b=2".to_string()]);
    }

    #[test]
    fn test_parse_all() {
        let changes = parse_all(&["1,2", "3-4,5"], parse_byte_change).unwrap();
        assert_eq!(
            changes,
            vec![ByteChange::single(1, 2), ByteChange::new(3, 4, 5)]
        );
        assert!(parse_all(&["1,2", "bad"], parse_byte_change).is_err());
    }
}
