// EEPROM access through the kernel driver's sysfs file

use super::device::{check_range, EepromDevice, EepromError, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// An EEPROM exposed by the at24 driver as a plain file
pub struct DriverEeprom {
    file: File,
    path: PathBuf,
    size: usize,
}

impl DriverEeprom {
    /// Open the driver file, read-write when permitted
    pub fn open(path: impl AsRef<Path>, size: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EepromError::DeviceNotFound(path.display().to_string()));
        }

        let file = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!("Opening {} read-only: {}", path.display(), e);
                File::open(path)?
            }
        };

        Ok(Self {
            file,
            path: path.to_path_buf(),
            size,
        })
    }
}

impl EepromDevice for DriverEeprom {
    fn describe(&self) -> String {
        format!("driver file {}", self.path.display())
    }

    fn size(&self) -> usize {
        self.size
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.size)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(offset, data.len(), self.size)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(data)?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn backing_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..=255u8).collect();
        file.write_all(&data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_write() {
        let file = backing_file();
        let mut eeprom = DriverEeprom::open(file.path(), 256).unwrap();

        let mut buf = [0u8; 4];
        eeprom.read(0x10, &mut buf).unwrap();
        assert_eq!(buf, [0x10, 0x11, 0x12, 0x13]);

        eeprom.write(0x10, &[0xaa, 0xbb]).unwrap();
        eeprom.read(0x0f, &mut buf).unwrap();
        assert_eq!(buf, [0x0f, 0xaa, 0xbb, 0x12]);

        let all = eeprom.read_all().unwrap();
        assert_eq!(all.len(), 256);
        assert_eq!(all[255], 0xff);

        let on_disk = std::fs::read(file.path()).unwrap();
        assert_eq!(&on_disk[0x10..0x12], &[0xaa, 0xbb]);
    }

    #[test]
    fn test_out_of_range() {
        let file = backing_file();
        let mut eeprom = DriverEeprom::open(file.path(), 256).unwrap();
        let mut buf = [0u8; 2];
        assert!(matches!(
            eeprom.read(255, &mut buf),
            Err(EepromError::InvalidRange { .. })
        ));
        assert!(matches!(
            eeprom.write(256, &[0]),
            Err(EepromError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = DriverEeprom::open(dir.path().join("eeprom"), 256);
        assert!(matches!(result, Err(EepromError::DeviceNotFound(_))));
    }
}
