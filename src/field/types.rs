// Field descriptors, runtime field views and field-level errors

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::ops::{self, FieldOps};

/// Why a numeric field value was rejected as out of range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeViolation {
    /// Minor version has more than two digits
    MinorVersion,
    /// major * 100 + minor does not fit in 16 bits
    VersionTooBig,
    /// Year does not fit in 16 bits
    YearOverflow,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RangeViolation::MinorVersion => "Minor version is 1-2 digits",
            RangeViolation::VersionTooBig => "Version is too big",
            RangeViolation::YearOverflow => "Year overflow",
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Invalid value \"{value}\" for field \"{field}\" - Syntax error")]
    Syntax { field: String, value: String },

    #[error("Invalid value \"{value}\" for field \"{field}\" - Value is too long")]
    ValueTooLong { field: String, value: String },

    #[error("Invalid value \"{value}\" for field \"{field}\" - {reason}")]
    OutOfRange {
        field: String,
        value: String,
        reason: RangeViolation,
    },

    #[error("Invalid value \"{value}\" for field \"{field}\" - {reason}")]
    InvalidDate {
        field: String,
        value: String,
        reason: &'static str,
    },
}

impl FieldError {
    pub(crate) fn syntax(field: &str, value: &str) -> Self {
        FieldError::Syntax {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn too_long(field: &str, value: &str) -> Self {
        FieldError::ValueTooLong {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn out_of_range(field: &str, value: &str, reason: RangeViolation) -> Self {
        FieldError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_date(field: &str, value: &str, reason: &'static str) -> Self {
        FieldError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
            reason,
        }
    }

    /// Name of the field the rejected value was meant for
    pub fn field(&self) -> &str {
        match self {
            FieldError::Syntax { field, .. }
            | FieldError::ValueTooLong { field, .. }
            | FieldError::OutOfRange { field, .. }
            | FieldError::InvalidDate { field, .. } => field,
        }
    }
}

pub type Result<T> = std::result::Result<T, FieldError>;

/// Encoding of a field's bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Hex blob, lowest offset printed first
    Binary,
    /// Hex blob, highest offset printed first
    ReversedBinary,
    /// Little-endian major * 100 + minor
    Version,
    /// NUL-terminated string
    Ascii,
    /// Colon-delimited hex bytes
    Mac,
    /// Day, month, little-endian year
    Date,
    /// Hex + ASCII dump of the whole record
    Raw,
    /// Unused space
    Reserved,
}

impl FieldType {
    /// The operations table entry for this type
    pub fn ops(self) -> &'static FieldOps {
        &ops::FIELD_OPS[self as usize]
    }

    /// Whether values can be written to fields of this type
    pub fn is_updatable(self) -> bool {
        self.ops().update.is_some()
    }

    /// Whether fields of this type can be reset to 0xFF
    pub fn is_clearable(self) -> bool {
        self.ops().clear.is_some()
    }
}

/// Static description of one field in a layout schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub key: &'static str,
    pub size: usize,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub const fn new(
        name: &'static str,
        key: &'static str,
        size: usize,
        field_type: FieldType,
    ) -> Self {
        Self {
            name,
            key,
            size,
            field_type,
        }
    }
}

/// A field view: a window into the owning layout's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    descriptor: &'static FieldDescriptor,
    offset: usize,
}

impl Field {
    pub fn new(descriptor: &'static FieldDescriptor, offset: usize) -> Self {
        Self { descriptor, offset }
    }

    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn key(&self) -> &'static str {
        self.descriptor.key
    }

    pub fn field_type(&self) -> FieldType {
        self.descriptor.field_type
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.descriptor.size
    }

    pub fn is_empty(&self) -> bool {
        self.descriptor.size == 0
    }

    /// Byte range of this field inside the layout buffer
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.descriptor.size
    }

    /// Check whether @name refers to this field
    pub fn is_named(&self, name: &str) -> bool {
        (self.field_type().ops().is_named)(self.descriptor, name)
    }

    /// Render this field's line(s) from the layout buffer
    pub fn print(&self, data: &[u8]) -> String {
        (self.field_type().ops().print)(self.name(), &data[self.range()])
    }

    /// The value text alone, without the name column
    pub fn value(&self, data: &[u8]) -> String {
        (self.field_type().ops().value)(&data[self.range()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static MAC: FieldDescriptor = FieldDescriptor::new("1st MAC Address", "mac1", 6, FieldType::Mac);
    static RSVD: FieldDescriptor =
        FieldDescriptor::new("Reserved fields", "rsvd", 4, FieldType::Reserved);

    #[test]
    fn test_field_window() {
        let field = Field::new(&MAC, 4);
        assert_eq!(field.range(), 4..10);
        assert_eq!(field.len(), 6);
        assert_eq!(field.key(), "mac1");
        assert!(field.is_named("mac1"));
        assert!(field.is_named("1st MAC Address"));
        assert!(!field.is_named("mac2"));
    }

    #[test]
    fn test_field_value_reads_only_window() {
        let field = Field::new(&MAC, 2);
        let data = [0xff, 0xff, 1, 2, 3, 4, 5, 6, 0xff];
        assert_eq!(field.value(&data), "01:02:03:04:05:06");
    }

    #[test]
    fn test_type_capabilities() {
        assert!(FieldType::Ascii.is_updatable());
        assert!(FieldType::Ascii.is_clearable());
        assert!(!FieldType::Reserved.is_updatable());
        assert!(FieldType::Reserved.is_clearable());
        assert!(!FieldType::Raw.is_updatable());
        assert!(!FieldType::Raw.is_clearable());
        assert!(Field::new(&RSVD, 0).print(&[0; 4]).contains("(4 bytes)"));
    }

    #[test]
    fn test_error_messages() {
        let err = FieldError::out_of_range("Major Revision", "1.234", RangeViolation::MinorVersion);
        assert_eq!(
            err.to_string(),
            "Invalid value \"1.234\" for field \"Major Revision\" - Minor version is 1-2 digits"
        );
        assert_eq!(err.field(), "Major Revision");
    }
}
