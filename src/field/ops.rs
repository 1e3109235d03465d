// Per-type field operations and the static dispatch table

use super::calendar::{is_valid_date, month_name, month_number};
use super::parser;
use super::types::{FieldDescriptor, FieldError, RangeViolation, Result};

/// Width of the name column in printed output
pub const NAME_COLUMN_WIDTH: usize = 30;

/// Value of an erased EEPROM byte
pub const CLEARED_BYTE: u8 = 0xff;

pub type PrintFn = fn(&str, &[u8]) -> String;
pub type ValueFn = fn(&[u8]) -> String;
pub type UpdateFn = fn(&str, &mut [u8], &str) -> Result<()>;
pub type ClearFn = fn(&mut [u8]);
pub type IsNamedFn = fn(&FieldDescriptor, &str) -> bool;

/// Operations available on one field type
pub struct FieldOps {
    /// Render the full output line(s), name column included
    pub print: PrintFn,
    /// Render the value text only
    pub value: ValueFn,
    pub update: Option<UpdateFn>,
    pub clear: Option<ClearFn>,
    pub is_named: IsNamedFn,
}

macro_rules! ops_updatable {
    ($value:ident, $update:ident) => {
        FieldOps {
            print: |name, buf| print_segment(name, &$value(buf)),
            value: $value,
            update: Some($update),
            clear: Some(clear_field),
            is_named,
        }
    };
}

/// Indexed by `FieldType as usize`
pub static FIELD_OPS: [FieldOps; 8] = [
    ops_updatable!(format_bin, update_bin),
    ops_updatable!(format_bin_rev, update_bin_rev),
    ops_updatable!(format_bin_ver, update_bin_ver),
    ops_updatable!(format_ascii, update_ascii),
    ops_updatable!(format_mac, update_mac),
    ops_updatable!(format_date, update_date),
    FieldOps {
        print: print_bin_raw,
        value: format_bin_raw,
        update: None,
        clear: None,
        is_named,
    },
    FieldOps {
        print: print_reserved,
        value: format_reserved,
        update: None,
        clear: Some(clear_field),
        is_named,
    },
];

fn print_segment(name: &str, value: &str) -> String {
    format!("{:<width$}{}\n", name, value, width = NAME_COLUMN_WIDTH)
}

fn is_named(descriptor: &FieldDescriptor, name: &str) -> bool {
    descriptor.key == name || descriptor.name == name
}

/// A cleared field is all 0xff
pub fn clear_field(buf: &mut [u8]) {
    buf.fill(CLEARED_BYTE);
}

fn join_hex<'a>(bytes: impl Iterator<Item = &'a u8>, delimiter: &str) -> String {
    bytes
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Hex digits, lowest offset first
/// Example: [0x01, 0x02, 0x0a] -> "01020a"
pub fn format_bin(buf: &[u8]) -> String {
    join_hex(buf.iter(), "")
}

/// Hex digits, highest offset first
/// Example: [0x01, 0x02, 0x0a] -> "0a0201"
pub fn format_bin_rev(buf: &[u8]) -> String {
    join_hex(buf.iter().rev(), "")
}

/// Example: [0x01, 0x02, 0xff] -> "01:02:ff"
pub fn format_mac(buf: &[u8]) -> String {
    join_hex(buf.iter(), ":")
}

/// Little-endian major * 100 + minor; 0xffff reads as 0.00
/// Example: [0x39, 0x30] -> "123.45"
pub fn format_bin_ver(buf: &[u8]) -> String {
    let raw = u16::from_le_bytes([buf[0], buf[1]]);
    let version = if raw == 0xffff { 0 } else { raw };
    format!("{}.{:02}", version / 100, version % 100)
}

/// Example: [7, 2, 0xde, 0x07] -> "07/Feb/2014"
pub fn format_date(buf: &[u8]) -> String {
    let year = u16::from_le_bytes([buf[2], buf[3]]);
    format!(
        "{:02}/{}/{}",
        buf[0],
        month_name(buf[1]).unwrap_or("BAD"),
        year
    )
}

/// A field holding nothing but 0x00 or 0xff words has never been written
fn is_trivial(buf: &[u8]) -> bool {
    let mut words = buf.chunks_exact(4);
    match words.next() {
        Some(first) => {
            let erased =
                first.iter().all(|&b| b == 0) || first.iter().all(|&b| b == CLEARED_BYTE);
            erased && words.all(|word| word == first)
        }
        None => false,
    }
}

/// String content up to the first NUL; empty for unwritten fields
pub fn format_ascii(buf: &[u8]) -> String {
    if is_trivial(buf) {
        return String::new();
    }

    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// Hex + ASCII dump, 16 bytes per row
pub fn format_bin_raw(buf: &[u8]) -> String {
    let mut output = String::from(
        "     0  1  2  3  4  5  6  7  8  9  a  b  c  d  e  f     0123456789abcdef\n",
    );

    for (row, chunk) in buf.chunks(16).enumerate() {
        output.push_str(&format!("{:02x}: ", row * 16));
        for byte in chunk {
            output.push_str(&format!("{:02x} ", byte));
        }
        output.push_str("    ");

        for &byte in chunk {
            let c = match byte {
                0x00 | 0xff => '.',
                0x20..=0x7e => byte as char,
                _ => '?',
            };
            output.push(c);
        }
        output.push('\n');
    }

    output
}

fn print_bin_raw(name: &str, buf: &[u8]) -> String {
    format!(
        "{:<width$}{}",
        name,
        format_bin_raw(buf),
        width = NAME_COLUMN_WIDTH
    )
}

pub fn format_reserved(buf: &[u8]) -> String {
    format!("({} bytes)", buf.len())
}

fn print_reserved(_name: &str, buf: &[u8]) -> String {
    print_segment("Reserved fields\t", &format_reserved(buf))
}

/// Decode hex text two characters at a time. Forward order fills from the
/// start of the text; reverse order takes pairs from the end of the text.
/// Either way the first decoded pair lands in byte 0 and the rest of the
/// field is zero.
fn update_hex(name: &str, buf: &mut [u8], value: &str, reverse: bool) -> Result<()> {
    if value.len() > buf.len() * 2 {
        return Err(FieldError::too_long(name, value));
    }

    if !value.is_ascii() {
        return Err(FieldError::syntax(name, value));
    }

    let text = value.as_bytes();
    let pairs: Vec<&[u8]> = if reverse {
        text.rchunks(2).collect()
    } else {
        text.chunks(2).collect()
    };

    let mut decoded = vec![0u8; buf.len()];
    for (slot, pair) in decoded.iter_mut().zip(pairs) {
        let digits = std::str::from_utf8(pair).map_err(|_| FieldError::syntax(name, value))?;
        *slot = parser::parse_hex_byte(digits).ok_or_else(|| FieldError::syntax(name, value))?;
    }

    buf.copy_from_slice(&decoded);
    Ok(())
}

/// Example: "10b234a" -> [0x10, 0xb2, 0x34, 0x0a, 0x00, ...]
pub fn update_bin(name: &str, buf: &mut [u8], value: &str) -> Result<()> {
    update_hex(name, buf, value, false)
}

/// Example: "1234" -> [0x34, 0x12, 0x00, ...]
pub fn update_bin_rev(name: &str, buf: &mut [u8], value: &str) -> Result<()> {
    update_hex(name, buf, value, true)
}

/// Example: "1:02:3:ff" -> [0x01, 0x02, 0x03, 0xff]
pub fn update_mac(name: &str, buf: &mut [u8], value: &str) -> Result<()> {
    let bytes = parser::parse_delimited_bytes(value)
        .filter(|bytes| bytes.len() == buf.len())
        .ok_or_else(|| FieldError::syntax(name, value))?;

    buf.copy_from_slice(&bytes);
    Ok(())
}

/// Example: "123.45" -> [0x39, 0x30]
pub fn update_bin_ver(name: &str, buf: &mut [u8], value: &str) -> Result<()> {
    let (major, minor) =
        parser::parse_version(value).ok_or_else(|| FieldError::syntax(name, value))?;

    if minor.len() > 2 {
        return Err(FieldError::out_of_range(
            name,
            value,
            RangeViolation::MinorVersion,
        ));
    }

    let minor: u64 = minor
        .parse()
        .map_err(|_| FieldError::syntax(name, value))?;
    let version = major
        .parse::<u64>()
        .ok()
        .and_then(|major| major.checked_mul(100))
        .and_then(|major| major.checked_add(minor))
        .and_then(|version| u16::try_from(version).ok())
        .ok_or_else(|| FieldError::out_of_range(name, value, RangeViolation::VersionTooBig))?;

    buf[..2].copy_from_slice(&version.to_le_bytes());
    Ok(())
}

/// Example: "07/Feb/2014" -> [0x07, 0x02, 0xde, 0x07]
pub fn update_date(name: &str, buf: &mut [u8], value: &str) -> Result<()> {
    let date = parser::parse_date(value).ok_or_else(|| FieldError::syntax(name, value))?;

    let day: u64 = date
        .day
        .parse()
        .map_err(|_| FieldError::syntax(name, value))?;
    if day == 0 {
        return Err(FieldError::invalid_date(name, value, "Invalid day"));
    }

    let month = month_number(date.month).ok_or_else(|| FieldError::syntax(name, value))?;

    let year: u64 = date
        .year
        .parse()
        .map_err(|_| FieldError::out_of_range(name, value, RangeViolation::YearOverflow))?;

    if !is_valid_date(day, month, year) {
        return Err(FieldError::invalid_date(name, value, "Invalid date"));
    }

    let year = u16::try_from(year)
        .map_err(|_| FieldError::out_of_range(name, value, RangeViolation::YearOverflow))?;

    let year = year.to_le_bytes();
    buf[..4].copy_from_slice(&[day as u8, month, year[0], year[1]]);
    Ok(())
}

/// Writes the text and a NUL terminator. Bytes after the terminator keep
/// whatever they held before.
pub fn update_ascii(name: &str, buf: &mut [u8], value: &str) -> Result<()> {
    let text = value.as_bytes();
    if text.len() >= buf.len() {
        return Err(FieldError::too_long(name, value));
    }

    buf[..text.len()].copy_from_slice(text);
    buf[text.len()] = 0;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "Test Field";

    #[test]
    fn test_bin_update_and_print() {
        let mut buf = [0xffu8; 4];
        update_bin(NAME, &mut buf, "0a0b0c0d").unwrap();
        assert_eq!(buf, [0x0a, 0x0b, 0x0c, 0x0d]);
        assert_eq!(format_bin(&buf), "0a0b0c0d");

        // Short input is zero padded at the end
        update_bin(NAME, &mut buf, "ab").unwrap();
        assert_eq!(buf, [0xab, 0, 0, 0]);
        assert_eq!(format_bin(&buf), "ab000000");

        // Trailing single nibble
        update_bin(NAME, &mut buf, "123").unwrap();
        assert_eq!(buf, [0x12, 0x03, 0, 0]);
    }

    #[test]
    fn test_bin_update_errors() {
        let mut buf = [0x55u8; 2];
        assert!(matches!(
            update_bin(NAME, &mut buf, "0102030"),
            Err(FieldError::ValueTooLong { .. })
        ));
        assert!(matches!(
            update_bin(NAME, &mut buf, "zz"),
            Err(FieldError::Syntax { .. })
        ));
        assert!(matches!(
            update_bin(NAME, &mut buf, "0-"),
            Err(FieldError::Syntax { .. })
        ));
        // Failed updates leave the field alone
        assert_eq!(buf, [0x55, 0x55]);
    }

    #[test]
    fn test_bin_rev_update_and_print() {
        let mut buf = [0u8; 4];
        update_bin_rev(NAME, &mut buf, "1234").unwrap();
        assert_eq!(buf, [0x34, 0x12, 0, 0]);
        assert_eq!(format_bin_rev(&buf), "00001234");

        update_bin_rev(NAME, &mut buf, "01020304").unwrap();
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(format_bin_rev(&buf), "01020304");

        // Leading single nibble
        update_bin_rev(NAME, &mut buf, "123").unwrap();
        assert_eq!(buf, [0x23, 0x01, 0, 0]);
        assert_eq!(format_bin_rev(&buf), "00000123");
    }

    #[test]
    fn test_version() {
        let mut buf = [0u8; 2];
        update_bin_ver(NAME, &mut buf, "123.45").unwrap();
        assert_eq!(buf, [0x39, 0x30]);
        assert_eq!(format_bin_ver(&buf), "123.45");

        update_bin_ver(NAME, &mut buf, "1.5").unwrap();
        assert_eq!(format_bin_ver(&buf), "1.05");

        update_bin_ver(NAME, &mut buf, "655.35").unwrap();
        assert_eq!(buf, [0xff, 0xff]);
        // The cleared sentinel reads as zero
        assert_eq!(format_bin_ver(&buf), "0.00");
    }

    #[test]
    fn test_version_errors() {
        let mut buf = [0u8; 2];
        assert!(matches!(
            update_bin_ver(NAME, &mut buf, "1-2"),
            Err(FieldError::Syntax { .. })
        ));
        assert!(matches!(
            update_bin_ver(NAME, &mut buf, "1"),
            Err(FieldError::Syntax { .. })
        ));
        assert!(matches!(
            update_bin_ver(NAME, &mut buf, "1.234"),
            Err(FieldError::OutOfRange {
                reason: RangeViolation::MinorVersion,
                ..
            })
        ));
        assert!(matches!(
            update_bin_ver(NAME, &mut buf, "655.36"),
            Err(FieldError::OutOfRange {
                reason: RangeViolation::VersionTooBig,
                ..
            })
        ));
        assert!(matches!(
            update_bin_ver(NAME, &mut buf, "99999999999999999999999.1"),
            Err(FieldError::OutOfRange {
                reason: RangeViolation::VersionTooBig,
                ..
            })
        ));
        assert_eq!(buf, [0, 0]);
    }

    #[test]
    fn test_date() {
        let mut buf = [0u8; 4];
        update_date(NAME, &mut buf, "07/Feb/2014").unwrap();
        assert_eq!(buf, [7, 2, 0xde, 0x07]);
        assert_eq!(format_date(&buf), "07/Feb/2014");

        update_date(NAME, &mut buf, "29/Feb/2016").unwrap();
        assert_eq!(format_date(&buf), "29/Feb/2016");

        update_date(NAME, &mut buf, "1/Dec/99").unwrap();
        assert_eq!(format_date(&buf), "01/Dec/99");
    }

    #[test]
    fn test_date_errors() {
        let mut buf = [0u8; 4];
        assert!(matches!(
            update_date(NAME, &mut buf, "29/Feb/2014"),
            Err(FieldError::InvalidDate { .. })
        ));
        assert!(matches!(
            update_date(NAME, &mut buf, "31/Apr/2014"),
            Err(FieldError::InvalidDate { .. })
        ));
        assert!(matches!(
            update_date(NAME, &mut buf, "00/Jan/2014"),
            Err(FieldError::InvalidDate { .. })
        ));
        assert!(matches!(
            update_date(NAME, &mut buf, "01/Foo/2014"),
            Err(FieldError::Syntax { .. })
        ));
        assert!(matches!(
            update_date(NAME, &mut buf, "01-Jan-2014"),
            Err(FieldError::Syntax { .. })
        ));
        assert!(matches!(
            update_date(NAME, &mut buf, "01/Jan/65536"),
            Err(FieldError::OutOfRange {
                reason: RangeViolation::YearOverflow,
                ..
            })
        ));
        assert_eq!(buf, [0; 4]);
    }

    #[test]
    fn test_bad_month_prints_marker() {
        assert_eq!(format_date(&[56, 13, 0x0f, 0x27]), "56/BAD/9999");
    }

    #[test]
    fn test_mac() {
        let mut buf = [0u8; 6];
        update_mac(NAME, &mut buf, "aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(buf, [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(format_mac(&buf), "aa:bb:cc:dd:ee:ff");

        update_mac(NAME, &mut buf, "1:2:3:4:5:6").unwrap();
        assert_eq!(format_mac(&buf), "01:02:03:04:05:06");

        for bad in ["aa:bb:cc:dd:ee", "aa:bb:cc:dd:ee:ff:00", "aa:bb:cc:dd:ee:fg", "aabbccddeeff"] {
            assert!(matches!(
                update_mac(NAME, &mut buf, bad),
                Err(FieldError::Syntax { .. })
            ));
        }
    }

    #[test]
    fn test_ascii() {
        let mut buf = [0xffu8; 16];
        assert_eq!(format_ascii(&buf), "");

        update_ascii(NAME, &mut buf, "CM-FX6").unwrap();
        assert_eq!(&buf[..7], b"CM-FX6\0");
        assert_eq!(format_ascii(&buf), "CM-FX6");

        // Remnants past the terminator are not cleared
        update_ascii(NAME, &mut buf, "AB").unwrap();
        assert_eq!(&buf[..7], b"AB\0FX6\0");
        assert_eq!(format_ascii(&buf), "AB");

        assert!(matches!(
            update_ascii(NAME, &mut buf, "0123456789abcdef"),
            Err(FieldError::ValueTooLong { .. })
        ));
        update_ascii(NAME, &mut buf, "0123456789abcde").unwrap();
        assert_eq!(format_ascii(&buf), "0123456789abcde");
    }

    #[test]
    fn test_ascii_trivial_detection() {
        assert_eq!(format_ascii(&[0u8; 16]), "");
        assert_eq!(format_ascii(&[0xffu8; 16]), "");

        let mut mixed = [0u8; 16];
        mixed[8..].fill(0xff);
        assert_eq!(format_ascii(&mixed), "");

        let mut unterminated = [b'x'; 16];
        unterminated[0] = b'y';
        assert_eq!(format_ascii(&unterminated), "yxxxxxxxxxxxxxxx");
    }

    #[test]
    fn test_clear() {
        let mut buf = [1u8, 2, 3];
        clear_field(&mut buf);
        assert_eq!(buf, [0xff; 3]);
    }

    #[test]
    fn test_raw_dump() {
        let mut buf = [0u8; 32];
        buf[0] = b'A';
        buf[1] = 0x01;
        buf[2] = 0xff;
        let dump = format_bin_raw(&buf);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("0123456789abcdef"));
        assert!(lines[1].starts_with("00: 41 01 ff 00"));
        assert!(lines[1].ends_with("A?.............."));
        assert!(lines[2].starts_with("10: "));
    }

    #[test]
    fn test_print_segment_width() {
        let line = (FIELD_OPS[0].print)("Serial Number", &[0x12, 0x34]);
        assert_eq!(line, format!("{:<30}1234\n", "Serial Number"));
        let reserved = (FIELD_OPS[7].print)("Reserved fields", &[0; 64]);
        assert_eq!(reserved, format!("{:<30}(64 bytes)\n", "Reserved fields\t"));
    }
}
