// Typed fields of an EEPROM record: descriptors, views and per-type operations

pub mod calendar;
pub mod ops;
pub mod parser;
pub mod types;

pub use ops::{FieldOps, CLEARED_BYTE, FIELD_OPS, NAME_COLUMN_WIDTH};
pub use types::{Field, FieldDescriptor, FieldError, FieldType, RangeViolation};
