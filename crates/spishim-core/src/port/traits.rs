//! Port trait definitions
//!
//! All traits are synchronous and blocking: every call maps onto a single
//! system call (or nothing at all, for the no-op implementations).

use crate::error::Result;

/// Raw identity of an open device handle (a file descriptor on Linux)
pub type RawHandle = i32;

/// Kernel SPI device
///
/// Implementations own exactly one device handle which is either open or
/// closed. Configuration and transfer calls on a closed port must fail with
/// `Error::DeviceNotOpen` rather than panic.
pub trait SpiPort {
    /// Open the device. Only called while the port is closed.
    fn open(&mut self) -> Result<()>;

    /// Close the device. Must be harmless when already closed.
    fn close(&mut self);

    /// Handle of the open device, or `None` when closed
    fn handle(&self) -> Option<RawHandle>;

    /// Whether the device is open
    fn is_open(&self) -> bool {
        self.handle().is_some()
    }

    /// Write the "least significant bit first" flag
    fn write_lsb_first(&mut self, lsb_first: bool) -> Result<()>;

    /// Write a native mode value (`SPI_MODE_0` .. `SPI_MODE_3`)
    fn write_mode(&mut self, mode: u8) -> Result<()>;

    /// Write the maximum clock speed in Hz
    fn write_max_speed_hz(&mut self, speed_hz: u32) -> Result<()>;

    /// Full-duplex exchange of `tx.len()` bytes as a single transfer
    ///
    /// `tx` and `rx` have the same length. On failure the contents of `rx`
    /// are whatever the driver left there.
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()>;
}

/// Digital pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Pin is read
    Input,
    /// Pin is driven
    Output,
}

/// Digital pin level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic low
    Low,
    /// Logic high
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// GPIO capability used while bringing the bus up
pub trait GpioController {
    /// Set the direction of `pin`
    fn pin_mode(&mut self, pin: u32, mode: PinMode) -> Result<()>;

    /// Drive `pin` to `level`
    fn digital_write(&mut self, pin: u32, level: Level) -> Result<()>;

    /// Route (or un-route) the SCK, MOSI and MISO pins to the SPI controller
    fn mux_select_spi(&mut self, enable: bool) -> Result<()>;
}

/// Platform hook to keep the SPI controller out of runtime suspend
pub trait PowerManagement {
    /// Disable autosuspend on the bus controller
    fn disable_autosuspend(&mut self) -> Result<()>;
}

/// GPIO controller for boards where the driver handles chip select and
/// the SPI pins are hard-wired
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGpio;

impl GpioController for NoGpio {
    fn pin_mode(&mut self, _pin: u32, _mode: PinMode) -> Result<()> {
        Ok(())
    }

    fn digital_write(&mut self, _pin: u32, _level: Level) -> Result<()> {
        Ok(())
    }

    fn mux_select_spi(&mut self, _enable: bool) -> Result<()> {
        Ok(())
    }
}

/// Power management hook for platforms that have none
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPowerManagement;

impl PowerManagement for NoPowerManagement {
    fn disable_autosuspend(&mut self) -> Result<()> {
        Ok(())
    }
}

macro_rules! forward_impls {
    ($($wrapper:ty),*) => {$(
        impl<T: SpiPort + ?Sized> SpiPort for $wrapper {
            fn open(&mut self) -> Result<()> {
                (**self).open()
            }
            fn close(&mut self) {
                (**self).close()
            }
            fn handle(&self) -> Option<RawHandle> {
                (**self).handle()
            }
            fn is_open(&self) -> bool {
                (**self).is_open()
            }
            fn write_lsb_first(&mut self, lsb_first: bool) -> Result<()> {
                (**self).write_lsb_first(lsb_first)
            }
            fn write_mode(&mut self, mode: u8) -> Result<()> {
                (**self).write_mode(mode)
            }
            fn write_max_speed_hz(&mut self, speed_hz: u32) -> Result<()> {
                (**self).write_max_speed_hz(speed_hz)
            }
            fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
                (**self).transfer(tx, rx)
            }
        }

        impl<T: GpioController + ?Sized> GpioController for $wrapper {
            fn pin_mode(&mut self, pin: u32, mode: PinMode) -> Result<()> {
                (**self).pin_mode(pin, mode)
            }
            fn digital_write(&mut self, pin: u32, level: Level) -> Result<()> {
                (**self).digital_write(pin, level)
            }
            fn mux_select_spi(&mut self, enable: bool) -> Result<()> {
                (**self).mux_select_spi(enable)
            }
        }

        impl<T: PowerManagement + ?Sized> PowerManagement for $wrapper {
            fn disable_autosuspend(&mut self) -> Result<()> {
                (**self).disable_autosuspend()
            }
        }
    )*};
}

forward_impls!(&mut T);
#[cfg(feature = "alloc")]
forward_impls!(alloc::boxed::Box<T>);
