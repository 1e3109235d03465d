// EEPROM device abstraction, configuration and errors

use crate::layout::EEPROM_SIZE;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EepromError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("EEPROM device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to select i2c address {addr:#04x}: {source}")]
    Ioctl {
        addr: u16,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("Invalid i2c address: {0:#x}")]
    InvalidAddress(u16),

    #[error("Access of {len} bytes at offset {offset:#x} exceeds EEPROM size {size}")]
    InvalidRange {
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("Unknown access mode: {0}")]
    InvalidMode(String),
}

pub type Result<T> = std::result::Result<T, EepromError>;

/// Highest 7-bit i2c address
pub const MAX_I2C_ADDR: u16 = 0x7f;

/// How to reach the EEPROM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Kernel driver file if present, raw i2c-dev otherwise
    #[default]
    Auto,
    /// sysfs file exposed by the at24 driver
    Driver,
    /// /dev/i2c-N with the I2C_SLAVE ioctl
    I2c,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessMode::Auto => "auto",
            AccessMode::Driver => "driver",
            AccessMode::I2c => "i2c",
        };
        f.write_str(name)
    }
}

impl FromStr for AccessMode {
    type Err = EepromError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(AccessMode::Auto),
            "driver" => Ok(AccessMode::Driver),
            "i2c" => Ok(AccessMode::I2c),
            other => Err(EepromError::InvalidMode(other.to_string())),
        }
    }
}

/// EEPROM access configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub mode: AccessMode,

    /// Directory holding the i2c device nodes in sysfs
    pub sysfs_root: PathBuf,

    /// Directory holding the i2c-N character devices
    pub dev_root: PathBuf,

    /// Largest write the chip accepts in one transaction
    pub page_size: usize,

    /// Time the chip needs to commit a page write
    pub write_delay: Duration,

    /// EEPROM size in bytes
    pub size: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mode: AccessMode::Auto,
            sysfs_root: PathBuf::from("/sys/bus/i2c/devices"),
            dev_root: PathBuf::from("/dev"),
            page_size: 16,
            write_delay: Duration::from_millis(5),
            size: EEPROM_SIZE,
        }
    }
}

impl DeviceConfig {
    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    /// Path of the at24 driver file for a device, e.g.
    /// /sys/bus/i2c/devices/3-0050/eeprom
    pub fn driver_path(&self, bus: u8, addr: u16) -> PathBuf {
        self.sysfs_root
            .join(format!("{}-{:04x}", bus, addr))
            .join("eeprom")
    }

    /// Path of the i2c-dev node for a bus, e.g. /dev/i2c-3
    pub fn i2c_path(&self, bus: u8) -> PathBuf {
        self.dev_root.join(format!("i2c-{}", bus))
    }
}

/// Byte-addressed access to an EEPROM
pub trait EepromDevice {
    /// Short description used in log messages
    fn describe(&self) -> String;

    /// Size of the device in bytes
    fn size(&self) -> usize {
        EEPROM_SIZE
    }

    /// Fill @buf from the device starting at @offset
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<()>;

    /// Store @data on the device starting at @offset
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()>;

    /// Read the whole device
    fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.size()];
        self.read(0, &mut buf)?;
        Ok(buf)
    }
}

/// Reject accesses that run past the end of the device
pub fn check_range(offset: usize, len: usize, size: usize) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(EepromError::InvalidRange { offset, len, size }),
    }
}
