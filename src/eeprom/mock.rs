// In-memory EEPROM for testing without hardware

use super::device::{check_range, EepromDevice, Result};
use crate::layout::EEPROM_SIZE;

/// In-memory EEPROM that records every write
#[derive(Debug, Clone)]
pub struct MockEeprom {
    data: Vec<u8>,
    writes: Vec<(usize, Vec<u8>)>,
}

impl MockEeprom {
    /// Create an erased (all 0xff) device
    pub fn new() -> Self {
        Self::with_data(vec![0xff; EEPROM_SIZE])
    }

    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data,
            writes: Vec::new(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// (offset, bytes) of every write so far
    pub fn writes(&self) -> &[(usize, Vec<u8>)] {
        &self.writes
    }
}

impl Default for MockEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl EepromDevice for MockEeprom {
    fn describe(&self) -> String {
        "mock EEPROM".to_string()
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.data.len())?;
        buf.copy_from_slice(&self.data[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(offset, data.len(), self.data.len())?;
        self.data[offset..offset + data.len()].copy_from_slice(data);
        self.writes.push((offset, data.to_vec()));
        Ok(())
    }
}
