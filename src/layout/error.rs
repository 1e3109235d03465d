// Error types for layout construction and batch operations

use crate::field::FieldError;
use thiserror::Error;

/// Render an offset or inclusive range the way diagnostics quote it:
/// '0x10' or '0x10-0x1f'
pub fn format_offset(start: &i64, end: &i64) -> String {
    if start == end {
        format!("'{}'", signed_hex(start))
    } else {
        format!("'{}-{}'", signed_hex(start), signed_hex(end))
    }
}

/// Two-digit hex with the sign kept apart: 0x0a, -0x01
pub fn signed_hex(n: &i64) -> String {
    if *n < 0 {
        format!("-0x{:02x}", n.unsigned_abs())
    } else {
        format!("0x{:02x}", n)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Field \"{0}\" not found")]
    UnknownField(String),

    #[error("Layout error: Can't operate on fields. The layout is unknown.")]
    FieldsUnavailable,

    #[error("Field \"{0}\" is read-only")]
    ReadOnlyField(String),

    #[error("Invalid offset {}", format_offset(.start, .end))]
    InvalidOffset { start: i64, end: i64 },

    #[error("Invalid value '{}' at offset {}", signed_hex(.value), format_offset(.start, .end))]
    InvalidValue { start: i64, end: i64, value: i64 },

    #[error("Invalid buffer size: layout needs {expected} bytes, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// A batch stopped at a failing entry. Entries before it stay applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("stopped after {applied} successful change(s)")]
pub struct BatchError {
    /// Changes reported as applied. Byte-range batches always report zero.
    pub applied: usize,
    #[source]
    pub error: LayoutError,
}

impl BatchError {
    pub fn new(applied: usize, error: LayoutError) -> Self {
        Self { applied, error }
    }
}
