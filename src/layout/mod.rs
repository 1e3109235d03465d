// EEPROM layouts: versioned schemas, detection and the update/clear engine

pub mod changes;
pub mod engine;
pub mod error;
pub mod schema;
pub mod version;

pub use changes::{ByteChange, ByteRange, FieldChange};
pub use engine::{FieldReport, Layout};
pub use error::{BatchError, LayoutError};
pub use schema::{schema_for, EEPROM_SIZE};
pub use version::{detect_layout, LayoutVersion, LAYOUT_CHECK_BYTE};
