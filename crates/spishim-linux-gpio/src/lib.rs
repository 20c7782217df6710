//! spishim-linux-gpio - Linux GPIO chip-select and pin-mux control
//!
//! This crate provides the `GpioController` implementation used by
//! `SpiBus::begin()` on Linux boards: it parks the chip-select line high
//! and drives the multiplexer lines that route SCK, MOSI and MISO to the
//! SPI controller.
//!
//! The implementation uses the gpiocdev crate, a pure Rust implementation
//! of the GPIO character device interface, which replaces the deprecated
//! sysfs GPIO interface.
//!
//! # Example
//!
//! ```no_run
//! use spishim_core::port::NoPowerManagement;
//! use spishim_core::SpiBus;
//! use spishim_linux_gpio::{LinuxGpio, LinuxGpioConfig};
//! use spishim_linux_spi::{LinuxSpi, LinuxSpiConfig};
//!
//! // Mux line 42 high routes the SPI function on this board
//! let gpio = LinuxGpio::new(&LinuxGpioConfig::new("/dev/gpiochip0").with_mux_line(42, true));
//! let spi = LinuxSpi::new(&LinuxSpiConfig::new("/dev/spidev1.0"));
//!
//! let mut bus = SpiBus::new(spi, gpio, NoPowerManagement).with_cs_pin(10);
//! bus.begin()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpio, LinuxGpioConfig, MuxLine, DEFAULT_GPIOCHIP};
pub use error::{LinuxGpioError, Result};

use spishim_core::port::GpioController;

/// Create a Linux GPIO controller from key-value options
///
/// This is a convenience function for use in the CLI port dispatch. No
/// lines are requested until `SpiBus::begin()`.
///
/// # Example Options
///
/// - `gpiochip=0` - GPIO chip number (or `gpiodev=/dev/gpiochipN`)
/// - `mux=40:1+41:0` - Optional: pin-mux lines and their SPI-select levels
pub fn linux_gpio_from_options(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn GpioController>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    Ok(Box::new(LinuxGpio::new(&config)))
}
