//! Raw EEPROM access through the Linux i2c-dev interface
//!
//! The EEPROM is addressed with a single offset byte: a read is an offset
//! write followed by a plain read, a write is the offset byte followed by up
//! to one page of data. The chip is busy for a few milliseconds after each
//! page write.

use super::device::{
    check_range, DeviceConfig, EepromDevice, EepromError, Result, MAX_I2C_ADDR,
};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::raw::c_int;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

mod ioctl {
    // From linux/i2c-dev.h
    const I2C_SLAVE: u16 = 0x0703;

    nix::ioctl_write_int_bad!(i2c_set_slave, I2C_SLAVE);
}

/// First and last address probed by a bus scan (the i2cdetect default)
pub const SCAN_FIRST_ADDR: u16 = 0x03;
pub const SCAN_LAST_ADDR: u16 = 0x77;

/// What a bus scan found at one address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Absent,
    /// Answered a one-byte read
    Present,
    /// Claimed by a kernel driver
    Busy,
}

fn open_bus(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(EepromError::DeviceNotFound(path.display().to_string()));
    }

    Ok(OpenOptions::new().read(true).write(true).open(path)?)
}

fn select_address(file: &File, addr: u16) -> Result<()> {
    if addr > MAX_I2C_ADDR {
        return Err(EepromError::InvalidAddress(addr));
    }

    // SAFETY: the fd is valid for the lifetime of `file` and I2C_SLAVE takes
    // the address by value.
    unsafe { ioctl::i2c_set_slave(file.as_raw_fd(), addr as c_int) }
        .map(|_| ())
        .map_err(|source| EepromError::Ioctl { addr, source })
}

/// An EEPROM reached through /dev/i2c-N
pub struct I2cEeprom {
    file: File,
    path: PathBuf,
    addr: u16,
    size: usize,
    page_size: usize,
    write_delay: Duration,
}

impl I2cEeprom {
    pub fn open(config: &DeviceConfig, bus: u8, addr: u16) -> Result<Self> {
        let path = config.i2c_path(bus);
        let file = open_bus(&path)?;
        select_address(&file, addr)?;

        tracing::debug!("Opened {} at address {:#04x}", path.display(), addr);

        Ok(Self {
            file,
            path,
            addr,
            size: config.size,
            page_size: config.page_size.max(1),
            write_delay: config.write_delay,
        })
    }
}

impl EepromDevice for I2cEeprom {
    fn describe(&self) -> String {
        format!("{} address {:#04x}", self.path.display(), self.addr)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.size)?;
        self.file.write_all(&[offset as u8])?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(offset, data.len(), self.size)?;

        let mut pos = 0;
        while pos < data.len() {
            let addr = offset + pos;
            // A page write wraps inside its page, so never cross a boundary
            let room = self.page_size - addr % self.page_size;
            let len = room.min(data.len() - pos);

            let mut frame = Vec::with_capacity(len + 1);
            frame.push(addr as u8);
            frame.extend_from_slice(&data[pos..pos + len]);
            self.file.write_all(&frame)?;

            tracing::trace!("Wrote {} bytes at {:#04x}", len, addr);
            thread::sleep(self.write_delay);
            pos += len;
        }

        Ok(())
    }
}

/// Check whether a device answers at @addr on @bus
pub fn probe_address(config: &DeviceConfig, bus: u8, addr: u16) -> Result<ProbeResult> {
    let mut file = open_bus(&config.i2c_path(bus))?;

    match select_address(&file, addr) {
        Ok(()) => {}
        Err(EepromError::Ioctl {
            source: nix::errno::Errno::EBUSY,
            ..
        }) => return Ok(ProbeResult::Busy),
        Err(e) => return Err(e),
    }

    let mut byte = [0u8; 1];
    Ok(match file.read(&mut byte) {
        Ok(1) => ProbeResult::Present,
        _ => ProbeResult::Absent,
    })
}

/// Probe every regular address on @bus and return those that responded
pub fn scan_bus(config: &DeviceConfig, bus: u8) -> Result<Vec<(u16, ProbeResult)>> {
    let mut found = Vec::new();
    for addr in SCAN_FIRST_ADDR..=SCAN_LAST_ADDR {
        match probe_address(config, bus, addr)? {
            ProbeResult::Absent => {}
            result => found.push((addr, result)),
        }
    }

    tracing::debug!("Bus {}: {} device(s) found", bus, found.len());
    Ok(found)
}

/// Bus numbers of all i2c-dev nodes, ascending
pub fn list_buses(config: &DeviceConfig) -> Result<Vec<u8>> {
    let mut buses: Vec<u8> = std::fs::read_dir(&config.dev_root)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix("i2c-"))
                .and_then(|num| num.parse().ok())
        })
        .collect();

    buses.sort_unstable();
    Ok(buses)
}
