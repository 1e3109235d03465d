// eeprom-util: decoder and editor for board configuration EEPROM records
// Copyright 2024 - Licensed under GPLv2 or later

pub mod commands;
pub mod eeprom;
pub mod field;
pub mod input;
pub mod layout;

// Re-export commonly used types
pub use commands::{CommandError, OutputFormat};
pub use eeprom::{open_eeprom, AccessMode, DeviceConfig, EepromDevice, EepromError};
pub use field::{Field, FieldDescriptor, FieldError, FieldType};
pub use layout::{
    detect_layout, BatchError, ByteChange, ByteRange, FieldChange, Layout, LayoutError,
    LayoutVersion, EEPROM_SIZE,
};

/// eeprom-util version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
