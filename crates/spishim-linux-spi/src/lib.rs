//! spishim-linux-spi - Linux spidev port
//!
//! This crate provides the `SpiPort` implementation for Linux spidev
//! character devices (`/dev/spidevX.Y`), plus a sysfs hook to keep the SPI
//! controller out of runtime suspend.
//!
//! # Overview
//!
//! The Linux SPI driver exposes SPI controllers through character devices
//! at `/dev/spidevX.Y` where X is the bus number and Y is the chip select.
//! Bus configuration goes through `SPI_IOC_WR_*` ioctls and every transfer
//! is a single full-duplex `SPI_IOC_MESSAGE(1)`.
//!
//! # Example
//!
//! ```no_run
//! use spishim_core::port::NoGpio;
//! use spishim_core::{DataMode, SpiBus};
//! use spishim_linux_spi::{LinuxSpi, LinuxSpiConfig, SysfsPowerControl, QUARK_POWER_CONTROL_PATH};
//!
//! let config = LinuxSpiConfig::new("/dev/spidev1.0");
//! let power = SysfsPowerControl::new(QUARK_POWER_CONTROL_PATH);
//! let mut bus = SpiBus::new(LinuxSpi::new(&config), NoGpio, power);
//!
//! bus.begin()?;
//! bus.set_data_mode(DataMode::Mode0)?;
//! let rx = bus.transfer(0x9F)?;
//! println!("Received {:02X}", rx);
//! bus.end();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y` device
//! - May require adding user to `spi` group or using udev rules

pub mod device;
pub mod error;
pub mod power;

// Re-exports
pub use device::{parse_options, LinuxSpi, LinuxSpiConfig, DEFAULT_SPIDEV_PATH};
pub use error::{LinuxSpiError, Result};
pub use power::{SysfsPowerControl, QUARK_POWER_CONTROL_PATH};

use spishim_core::port::{NoPowerManagement, PowerManagement, SpiPort};

/// Boxed port and power hook built from port-string options
pub type LinuxSpiParts = (Box<dyn SpiPort>, Box<dyn PowerManagement>);

/// Create a Linux SPI port and its power hook from key-value options
///
/// This is a convenience function for use in the CLI port dispatch. The
/// device is not opened until `SpiBus::begin()`.
///
/// # Example Options
///
/// - `dev=/dev/spidev1.0` - Optional: device path (default: /dev/spidev1.0)
/// - `power=/sys/.../power/control` - Optional: disable runtime PM via this file
pub fn linux_spi_from_options(
    options: &[(&str, &str)],
) -> std::result::Result<LinuxSpiParts, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let power: Box<dyn PowerManagement> = match &config.power_control {
        Some(path) => Box::new(SysfsPowerControl::new(path)),
        None => Box::new(NoPowerManagement),
    };
    let port: Box<dyn SpiPort> = Box::new(LinuxSpi::new(&config));
    Ok((port, power))
}
