// Layout versions and content-based detection

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Offset of the byte that identifies the layout version
pub const LAYOUT_CHECK_BYTE: usize = 44;

/// Schema version of an EEPROM record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVersion {
    /// Resolve the version from the record itself. Input only.
    #[default]
    AutoDetect,
    Legacy,
    V1,
    V2,
    V3,
    V4,
    /// No schema matches; the record is shown as a raw dump
    Unrecognized,
}

impl LayoutVersion {
    /// Resolve AutoDetect against @data; explicit versions pass through
    pub fn resolve(self, data: &[u8]) -> LayoutVersion {
        match self {
            LayoutVersion::AutoDetect => detect_layout(data),
            explicit => explicit,
        }
    }

    pub fn is_raw(self) -> bool {
        matches!(self, LayoutVersion::Unrecognized)
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutVersion::AutoDetect => "auto",
            LayoutVersion::Legacy => "legacy",
            LayoutVersion::V1 => "v1",
            LayoutVersion::V2 => "v2",
            LayoutVersion::V3 => "v3",
            LayoutVersion::V4 => "v4",
            LayoutVersion::Unrecognized => "raw",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown layout version: {0}")]
pub struct ParseLayoutVersionError(String);

impl FromStr for LayoutVersion {
    type Err = ParseLayoutVersionError;

    /// Accepts "auto", "legacy", "raw", and "1".."4" with an optional "v"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => return Ok(LayoutVersion::AutoDetect),
            "legacy" => return Ok(LayoutVersion::Legacy),
            "raw" => return Ok(LayoutVersion::Unrecognized),
            _ => {}
        }

        match s.strip_prefix('v').unwrap_or(s) {
            "1" => Ok(LayoutVersion::V1),
            "2" => Ok(LayoutVersion::V2),
            "3" => Ok(LayoutVersion::V3),
            "4" => Ok(LayoutVersion::V4),
            _ => Err(ParseLayoutVersionError(s.to_string())),
        }
    }
}

/// Pick a layout version from the check byte of @data
///
/// 0x00 and 0xff mean v1 (the byte was never written), 2..=4 name the
/// version directly, and printable characters belong to the legacy layout's
/// configuration string. Anything else is unrecognized.
pub fn detect_layout(data: &[u8]) -> LayoutVersion {
    let version = match data.get(LAYOUT_CHECK_BYTE) {
        Some(0xff) | Some(0x00) => LayoutVersion::V1,
        Some(0x02) => LayoutVersion::V2,
        Some(0x03) => LayoutVersion::V3,
        Some(0x04) => LayoutVersion::V4,
        Some(&b) if b >= 0x20 => LayoutVersion::Legacy,
        _ => LayoutVersion::Unrecognized,
    };

    tracing::debug!("Detected layout {}", version);
    version
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_check_byte(value: u8) -> Vec<u8> {
        let mut data = vec![0u8; 256];
        data[LAYOUT_CHECK_BYTE] = value;
        data
    }

    #[test]
    fn test_detect_layout() {
        assert_eq!(detect_layout(&with_check_byte(0xff)), LayoutVersion::V1);
        assert_eq!(detect_layout(&with_check_byte(0x00)), LayoutVersion::V1);
        assert_eq!(detect_layout(&with_check_byte(0x02)), LayoutVersion::V2);
        assert_eq!(detect_layout(&with_check_byte(0x03)), LayoutVersion::V3);
        assert_eq!(detect_layout(&with_check_byte(0x04)), LayoutVersion::V4);
        assert_eq!(
            detect_layout(&with_check_byte(0x05)),
            LayoutVersion::Unrecognized
        );
        assert_eq!(
            detect_layout(&with_check_byte(0x1f)),
            LayoutVersion::Unrecognized
        );
        assert_eq!(detect_layout(&with_check_byte(0x30)), LayoutVersion::Legacy);
        assert_eq!(detect_layout(&with_check_byte(0x20)), LayoutVersion::Legacy);
    }

    #[test]
    fn test_detect_short_buffer() {
        assert_eq!(detect_layout(&[0u8; 10]), LayoutVersion::Unrecognized);
    }

    #[test]
    fn test_default_is_auto() {
        assert_eq!(LayoutVersion::default(), LayoutVersion::AutoDetect);
    }

    #[test]
    fn test_resolve() {
        let data = with_check_byte(0x03);
        assert_eq!(LayoutVersion::AutoDetect.resolve(&data), LayoutVersion::V3);
        assert_eq!(LayoutVersion::Legacy.resolve(&data), LayoutVersion::Legacy);
        assert_eq!(
            LayoutVersion::Unrecognized.resolve(&data),
            LayoutVersion::Unrecognized
        );
    }

    #[test]
    fn test_parse_version() {
        assert_eq!("auto".parse(), Ok(LayoutVersion::AutoDetect));
        assert_eq!("legacy".parse(), Ok(LayoutVersion::Legacy));
        assert_eq!("raw".parse(), Ok(LayoutVersion::Unrecognized));
        assert_eq!("1".parse(), Ok(LayoutVersion::V1));
        assert_eq!("v4".parse(), Ok(LayoutVersion::V4));
        assert!("5".parse::<LayoutVersion>().is_err());
        assert!("v".parse::<LayoutVersion>().is_err());
        assert!("".parse::<LayoutVersion>().is_err());
    }
}
