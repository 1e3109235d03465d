// Field tables for each layout version

use super::version::LayoutVersion;
use crate::field::{FieldDescriptor, FieldType};

use FieldType::*;

/// Size of the EEPROM record in bytes
pub const EEPROM_SIZE: usize = 256;

/// Name of the single field used when no layout matches
pub const NO_LAYOUT_FIELDS: &str = "Unknown layout. Dumping raw data\n";

const fn field(name: &'static str, key: &'static str, size: usize, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor::new(name, key, size, ty)
}

pub static LAYOUT_LEGACY: [FieldDescriptor; 5] = [
    field("MAC address", "mac", 6, Mac),
    field("Board Revision", "rev", 2, Binary),
    field("Serial Number", "sn", 8, Binary),
    field("Board Configuration", "conf", 64, Ascii),
    field("Reserved fields", "rsvd", 176, Reserved),
];

pub static LAYOUT_V1: [FieldDescriptor; 12] = [
    field("Major Revision", "major", 2, Version),
    field("Minor Revision", "minor", 2, Version),
    field("1st MAC Address", "mac1", 6, Mac),
    field("2nd MAC Address", "mac2", 6, Mac),
    field("Production Date", "date", 4, Date),
    field("Serial Number", "sn", 12, ReversedBinary),
    field("Reserved fields", "rsvd", 96, Reserved),
    field("Product Name", "name", 16, Ascii),
    field("Product Options #1", "opt1", 16, Ascii),
    field("Product Options #2", "opt2", 16, Ascii),
    field("Product Options #3", "opt3", 16, Ascii),
    field("Reserved fields", "rsvd", 64, Reserved),
];

pub static LAYOUT_V2: [FieldDescriptor; 15] = [
    field("Major Revision", "major", 2, Version),
    field("Minor Revision", "minor", 2, Version),
    field("1st MAC Address", "mac1", 6, Mac),
    field("2nd MAC Address", "mac2", 6, Mac),
    field("Production Date", "date", 4, Date),
    field("Serial Number", "sn", 12, ReversedBinary),
    field("3rd MAC Address (WIFI)", "mac3", 6, Mac),
    field("4th MAC Address (Bluetooth)", "mac4", 6, Mac),
    field("Layout Version", "layout", 1, Binary),
    field("Reserved fields", "rsvd", 83, Reserved),
    field("Product Name", "name", 16, Ascii),
    field("Product Options #1", "opt1", 16, Ascii),
    field("Product Options #2", "opt2", 16, Ascii),
    field("Product Options #3", "opt3", 16, Ascii),
    field("Reserved fields", "rsvd", 64, Reserved),
];

pub static LAYOUT_V3: [FieldDescriptor; 16] = [
    field("Major Revision", "major", 2, Version),
    field("Minor Revision", "minor", 2, Version),
    field("1st MAC Address", "mac1", 6, Mac),
    field("2nd MAC Address", "mac2", 6, Mac),
    field("Production Date", "date", 4, Date),
    field("Serial Number", "sn", 12, ReversedBinary),
    field("3rd MAC Address (WIFI)", "mac3", 6, Mac),
    field("4th MAC Address (Bluetooth)", "mac4", 6, Mac),
    field("Layout Version", "layout", 1, Binary),
    field("CompuLab EEPROM ID", "id", 3, Binary),
    field("Reserved fields", "rsvd", 80, Reserved),
    field("Product Name", "name", 16, Ascii),
    field("Product Options #1", "opt1", 16, Ascii),
    field("Product Options #2", "opt2", 16, Ascii),
    field("Product Options #3", "opt3", 16, Ascii),
    field("Reserved fields", "rsvd", 64, Reserved),
];

pub static LAYOUT_V4: [FieldDescriptor; 21] = [
    field("Major Revision", "major", 2, Version),
    field("Minor Revision", "minor", 2, Version),
    field("1st MAC Address", "mac1", 6, Mac),
    field("2nd MAC Address", "mac2", 6, Mac),
    field("Production Date", "date", 4, Date),
    field("Serial Number", "sn", 12, ReversedBinary),
    field("3rd MAC Address (WIFI)", "mac3", 6, Mac),
    field("4th MAC Address (Bluetooth)", "mac4", 6, Mac),
    field("Layout Version", "layout", 1, Binary),
    field("CompuLab EEPROM ID", "id", 3, Binary),
    field("5th MAC Address", "mac5", 6, Mac),
    field("6th MAC Address", "mac6", 6, Mac),
    field("Scratchpad", "spad", 4, Binary),
    field("Reserved fields", "rsvd", 64, Reserved),
    field("Product Name", "name", 16, Ascii),
    field("Product Options #1", "opt1", 16, Ascii),
    field("Product Options #2", "opt2", 16, Ascii),
    field("Product Options #3", "opt3", 16, Ascii),
    field("Product Options #4", "opt4", 16, Ascii),
    field("Product Options #5", "opt5", 16, Ascii),
    field("Reserved fields", "rsvd", 32, Reserved),
];

pub static LAYOUT_RAW: [FieldDescriptor; 1] = [field(NO_LAYOUT_FIELDS, "raw", EEPROM_SIZE, Raw)];

/// Field table for a resolved layout version. AutoDetect has no table of its
/// own and maps to the raw dump.
pub fn schema_for(version: LayoutVersion) -> &'static [FieldDescriptor] {
    match version {
        LayoutVersion::Legacy => &LAYOUT_LEGACY,
        LayoutVersion::V1 => &LAYOUT_V1,
        LayoutVersion::V2 => &LAYOUT_V2,
        LayoutVersion::V3 => &LAYOUT_V3,
        LayoutVersion::V4 => &LAYOUT_V4,
        LayoutVersion::AutoDetect | LayoutVersion::Unrecognized => &LAYOUT_RAW,
    }
}

/// Bytes covered by a field table
pub fn schema_size(schema: &[FieldDescriptor]) -> usize {
    schema.iter().map(|f| f.size).sum()
}
