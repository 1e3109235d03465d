// EEPROM hardware access: sysfs driver file and raw i2c-dev
pub mod device;
pub mod driver;
pub mod i2c;

#[cfg(test)]
pub mod mock;

pub use device::{AccessMode, DeviceConfig, EepromDevice, EepromError, Result, MAX_I2C_ADDR};
pub use driver::DriverEeprom;
pub use i2c::{list_buses, scan_bus, I2cEeprom, ProbeResult};

/// Open the EEPROM at @addr on @bus using the configured access mode
///
/// In auto mode the driver file is preferred; raw i2c-dev access is used
/// when the driver is not bound to the device.
pub fn open_eeprom(config: &DeviceConfig, bus: u8, addr: u16) -> Result<Box<dyn EepromDevice>> {
    let device: Box<dyn EepromDevice> = match config.mode {
        AccessMode::Driver => Box::new(DriverEeprom::open(
            config.driver_path(bus, addr),
            config.size,
        )?),
        AccessMode::I2c => Box::new(I2cEeprom::open(config, bus, addr)?),
        AccessMode::Auto => match DriverEeprom::open(config.driver_path(bus, addr), config.size) {
            Ok(driver) => Box::new(driver),
            Err(e) => {
                tracing::debug!("Driver access unavailable ({}), trying i2c-dev", e);
                Box::new(I2cEeprom::open(config, bus, addr)?)
            }
        },
    };

    tracing::info!("Using {}", device.describe());
    Ok(device)
}
