// Change requests accepted by the batch operations

use serde::Serialize;

/// Set a named field to a textual value; an empty value clears the field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub key: String,
    pub value: String,
}

impl FieldChange {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Fill the inclusive offset range [start, end] with one byte value.
/// Signed so that out-of-range input reaches validation unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteChange {
    pub start: i64,
    pub end: i64,
    pub value: i64,
}

impl ByteChange {
    pub fn new(start: i64, end: i64, value: i64) -> Self {
        Self { start, end, value }
    }

    pub fn single(offset: i64, value: i64) -> Self {
        Self::new(offset, offset, value)
    }
}

/// Inclusive offset range to clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub start: i64,
    pub end: i64,
}

impl ByteRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn single(offset: i64) -> Self {
        Self::new(offset, offset)
    }
}
