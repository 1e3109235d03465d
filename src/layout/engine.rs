// Decoded EEPROM record and the batch update/clear engine

use super::changes::{ByteChange, ByteRange, FieldChange};
use super::error::{BatchError, LayoutError, Result};
use super::schema::{schema_for, schema_size};
use super::version::LayoutVersion;
use crate::field::{ops, Field, FieldType, CLEARED_BYTE};
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

/// One field as it appears in machine-readable output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub name: String,
    pub key: String,
    pub offset: usize,
    pub size: usize,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub value: Option<String>,
}

/// An EEPROM record decoded according to one layout version
///
/// The layout owns a copy of the record. Fields are windows into that copy,
/// laid out back to back in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    version: LayoutVersion,
    data: Vec<u8>,
    fields: Vec<Field>,
}

impl Layout {
    /// Decode @buf with the requested version, detecting it if AutoDetect
    pub fn new(buf: &[u8], requested: LayoutVersion) -> Result<Self> {
        let version = requested.resolve(buf);
        let schema = schema_for(version);

        let expected = schema_size(schema);
        if buf.len() < expected {
            return Err(LayoutError::InvalidBufferSize {
                expected,
                actual: buf.len(),
            });
        }

        let mut offset = 0;
        let fields = schema
            .iter()
            .map(|descriptor| {
                let field = Field::new(descriptor, offset);
                offset += descriptor.size;
                field
            })
            .collect();

        tracing::debug!(
            "Built layout {} (requested {}) with {} fields",
            version,
            requested,
            schema.len()
        );

        Ok(Self {
            version,
            data: buf[..expected].to_vec(),
            fields,
        })
    }

    /// The resolved layout version; never AutoDetect
    pub fn version(&self) -> LayoutVersion {
        self.version
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The record bytes, including any changes applied so far
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn field_bytes(&self, field: &Field) -> &[u8] {
        &self.data[field.range()]
    }

    /// Find the first field whose key or display name is @name
    pub fn find_field(&self, name: &str) -> Result<Field> {
        if self.version.is_raw() {
            return Err(LayoutError::FieldsUnavailable);
        }

        self.fields
            .iter()
            .find(|field| field.is_named(name))
            .copied()
            .ok_or_else(|| LayoutError::UnknownField(name.to_string()))
    }

    /// Value text of one field
    pub fn field_value(&self, name: &str) -> Result<String> {
        let field = self.find_field(name)?;
        Ok(field.value(&self.data))
    }

    /// Render every field in schema order
    pub fn render(&self) -> String {
        self.fields
            .iter()
            .map(|field| field.print(&self.data))
            .collect()
    }

    /// Machine-readable view of every field
    pub fn report(&self) -> Vec<FieldReport> {
        self.fields
            .iter()
            .map(|field| {
                let bytes = self.field_bytes(field);
                let value = match field.field_type() {
                    FieldType::Reserved => None,
                    FieldType::Raw => Some(ops::format_bin(bytes)),
                    _ => Some(field.value(&self.data)),
                };

                FieldReport {
                    name: field.name().trim_end().to_string(),
                    key: field.key().to_string(),
                    offset: field.offset(),
                    size: field.len(),
                    field_type: field.field_type(),
                    value,
                }
            })
            .collect()
    }

    /// Apply one textual value to a field; an empty value clears it
    pub fn update_field(&mut self, name: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            return self.clear_field(name);
        }

        let field = self.find_field(name)?;
        let update = field
            .field_type()
            .ops()
            .update
            .ok_or_else(|| LayoutError::ReadOnlyField(field.name().to_string()))?;

        update(field.name(), &mut self.data[field.range()], value)?;
        Ok(())
    }

    /// Reset a field to the erased state (all 0xff)
    pub fn clear_field(&mut self, name: &str) -> Result<()> {
        let field = self.find_field(name)?;
        let clear = field
            .field_type()
            .ops()
            .clear
            .ok_or_else(|| LayoutError::ReadOnlyField(field.name().to_string()))?;

        clear(&mut self.data[field.range()]);
        Ok(())
    }

    /// Apply field changes in order, stopping at the first failure
    ///
    /// Returns the number of fields updated. On failure the error carries the
    /// number of changes applied before the failing one; those stay applied.
    pub fn update_fields(&mut self, changes: &[FieldChange]) -> std::result::Result<usize, BatchError> {
        for (applied, change) in changes.iter().enumerate() {
            if let Err(error) = self.update_field(&change.key, &change.value) {
                tracing::warn!("Field update stopped at \"{}\": {}", change.key, error);
                return Err(BatchError::new(applied, error));
            }
        }

        Ok(changes.len())
    }

    /// Clear named fields in order, stopping at the first failure
    pub fn clear_fields<S: AsRef<str>>(&mut self, names: &[S]) -> std::result::Result<usize, BatchError> {
        for (applied, name) in names.iter().enumerate() {
            if let Err(error) = self.clear_field(name.as_ref()) {
                tracing::warn!("Field clear stopped at \"{}\": {}", name.as_ref(), error);
                return Err(BatchError::new(applied, error));
            }
        }

        Ok(names.len())
    }

    /// Validate an inclusive offset range against the record size
    fn byte_range(&self, start: i64, end: i64) -> Result<RangeInclusive<usize>> {
        let size = self.data.len() as i64;
        if start < 0 || start >= size || end < start || end >= size {
            return Err(LayoutError::InvalidOffset { start, end });
        }

        Ok(start as usize..=end as usize)
    }

    fn fill_bytes(&mut self, start: i64, end: i64, value: i64) -> Result<usize> {
        let range = self.byte_range(start, end)?;
        let value =
            u8::try_from(value).map_err(|_| LayoutError::InvalidValue { start, end, value })?;

        let count = range.end() - range.start() + 1;
        self.data[range].fill(value);
        Ok(count)
    }

    /// Fill byte ranges in order and return the number of bytes written
    ///
    /// The first invalid entry aborts the call with zero bytes reported,
    /// even though entries before it were already written.
    pub fn update_bytes(&mut self, changes: &[ByteChange]) -> std::result::Result<usize, BatchError> {
        let mut updated = 0;
        for change in changes {
            match self.fill_bytes(change.start, change.end, change.value) {
                Ok(count) => updated += count,
                Err(error) => {
                    tracing::warn!("Byte update aborted: {}", error);
                    return Err(BatchError::new(0, error));
                }
            }
        }

        Ok(updated)
    }

    /// Clear byte ranges to 0xff; same abort rules as update_bytes
    pub fn clear_bytes(&mut self, ranges: &[ByteRange]) -> std::result::Result<usize, BatchError> {
        let changes: Vec<ByteChange> = ranges
            .iter()
            .map(|r| ByteChange::new(r.start, r.end, CLEARED_BYTE as i64))
            .collect();

        self.update_bytes(&changes)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
