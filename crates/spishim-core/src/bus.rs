//! Arduino-style SPI master bus
//!
//! `SpiBus` owns one `SpiPort` plus the GPIO and power-management
//! capabilities needed to bring it up. Configuration is held in memory and
//! pushed to the device on `begin()`, so settings made before `begin()` or
//! across an `end()`/`begin()` cycle are restored.
//!
//! The only states are closed and open. Every configuration and transfer
//! call is attempted regardless; on a closed port the port reports
//! `Error::DeviceNotOpen` and the stored configuration stays as it was.

use crate::error::{Error, Result};
use crate::port::{GpioController, Level, PinMode, PowerManagement, RawHandle, SpiPort};
use crate::spi::{BitOrder, ClockDivider, ClockSource, DataMode};

/// Default chip-select pin
pub const DEFAULT_CS_PIN: u32 = 10;

/// Byte returned by `transfer_or_sentinel` when the transfer fails
pub const TRANSFER_FAILED_SENTINEL: u8 = 0xFF;

/// SPI master bus
///
/// Construct one per physical controller and pass it to the code that
/// needs it.
pub struct SpiBus<P, G, M> {
    port: P,
    gpio: G,
    power: M,
    cs_pin: u32,
    mode: DataMode,
    bit_order: BitOrder,
    clock: ClockSource,
}

impl<P, G, M> SpiBus<P, G, M>
where
    P: SpiPort,
    G: GpioController,
    M: PowerManagement,
{
    /// Create a bus with the conventional defaults (mode 0, MSB first, DIV4)
    ///
    /// Nothing touches the hardware until `begin()`.
    pub fn new(port: P, gpio: G, power: M) -> Self {
        Self {
            port,
            gpio,
            power,
            cs_pin: DEFAULT_CS_PIN,
            mode: DataMode::default(),
            bit_order: BitOrder::default(),
            clock: ClockSource::default(),
        }
    }

    /// Use a different chip-select pin
    pub fn with_cs_pin(mut self, pin: u32) -> Self {
        self.cs_pin = pin;
        self
    }

    /// Bring the bus up
    ///
    /// Disables controller power management (best effort), parks chip
    /// select high, routes the SPI pins, opens the device if it is not
    /// already open and re-applies the stored clock, bit order and mode.
    ///
    /// All three settings are attempted even if one fails; the first
    /// failure is returned.
    pub fn begin(&mut self) -> Result<()> {
        if let Err(e) = self.power.disable_autosuspend() {
            log::warn!("spi: Could not disable power management: {}", e);
        }

        self.setup_pins().map_err(|e| {
            log::error!("spi: Failed to set up SPI pins: {}", e);
            e
        })?;

        if !self.port.is_open() {
            self.port.open().map_err(|e| {
                log::error!("spi: Failed to open SPI device: {}", e);
                Error::DeviceOpenFailed
            })?;
        }

        log::debug!(
            "spi: Applying {}, {}, clock {}",
            self.mode,
            self.bit_order,
            self.clock
        );

        let clock = self.apply_clock(self.clock);
        let order = self.set_bit_order(self.bit_order);
        let mode = self.set_data_mode(self.mode);
        clock.and(order).and(mode)
    }

    fn setup_pins(&mut self) -> Result<()> {
        self.gpio.pin_mode(self.cs_pin, PinMode::Output)?;
        self.gpio.digital_write(self.cs_pin, Level::High)?;
        self.gpio.mux_select_spi(true)
    }

    /// Close the device
    ///
    /// Stored configuration is kept so a later `begin()` restores it.
    /// Calling this on a closed bus does nothing.
    pub fn end(&mut self) {
        if self.port.is_open() {
            self.port.close();
            log::debug!("spi: Closed SPI device");
        }
    }

    /// Set the order bits are shifted out in
    pub fn set_bit_order(&mut self, order: BitOrder) -> Result<()> {
        self.port
            .write_lsb_first(order.lsb_first())
            .map_err(|e| config_error("bit order", e))?;
        self.bit_order = order;
        Ok(())
    }

    /// Set the bit order from an Arduino `LSBFIRST`/`MSBFIRST` code
    pub fn set_bit_order_raw(&mut self, code: u8) -> Result<()> {
        let order = BitOrder::try_from(code).map_err(|e| {
            log::error!("spi: Invalid bit order {}", code);
            e
        })?;
        self.set_bit_order(order)
    }

    /// Set the clock polarity/phase mode
    pub fn set_data_mode(&mut self, mode: DataMode) -> Result<()> {
        self.port
            .write_mode(mode.native())
            .map_err(|e| config_error("mode", e))?;
        self.mode = mode;
        Ok(())
    }

    /// Set the mode from an Arduino `SPI_MODEn` code
    pub fn set_data_mode_raw(&mut self, code: u8) -> Result<()> {
        let mode = DataMode::try_from(code).map_err(|e| {
            log::error!("spi: Invalid SPI mode {}", code);
            e
        })?;
        self.set_data_mode(mode)
    }

    /// Set the clock from one of the divider steps
    pub fn set_clock_divider(&mut self, div: ClockDivider) -> Result<()> {
        self.apply_clock(ClockSource::Divider(div))
    }

    /// Set the clock from an Arduino `SPI_CLOCK_DIVn` code
    pub fn set_clock_divider_raw(&mut self, code: u8) -> Result<()> {
        let div = ClockDivider::try_from(code).map_err(|e| {
            log::error!("spi: Invalid clock divider 0x{:02X}", code);
            e
        })?;
        self.set_clock_divider(div)
    }

    /// Set an explicit clock speed, clamped to the controller maximum
    pub fn set_clock_speed(&mut self, hz: u32) -> Result<()> {
        self.apply_clock(ClockSource::explicit(hz))
    }

    fn apply_clock(&mut self, clock: ClockSource) -> Result<()> {
        self.port
            .write_max_speed_hz(clock.speed_hz())
            .map_err(|e| config_error("clock speed", e))?;
        self.clock = clock;
        Ok(())
    }

    /// Exchange one byte
    pub fn transfer(&mut self, byte: u8) -> Result<u8> {
        let tx = [byte];
        let mut rx = [TRANSFER_FAILED_SENTINEL];
        self.port.transfer(&tx, &mut rx).map_err(transfer_error)?;
        log::trace!("spi: {:02X} -> {:02X}", byte, rx[0]);
        Ok(rx[0])
    }

    /// Exchange one byte, returning 0xFF on failure
    ///
    /// A failed transfer cannot be told apart from a received 0xFF except
    /// through the log. Prefer `transfer`.
    pub fn transfer_or_sentinel(&mut self, byte: u8) -> u8 {
        self.transfer(byte).unwrap_or(TRANSFER_FAILED_SENTINEL)
    }

    /// Full-duplex exchange of `tx.len()` bytes in a single transfer
    ///
    /// `rx` must be the same length as `tx`. An empty exchange on an open
    /// bus succeeds without touching the device. If the transfer fails, the
    /// contents of `rx` are undefined (whatever the driver left there).
    pub fn transfer_buffer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        if tx.len() != rx.len() || u32::try_from(tx.len()).is_err() {
            log::error!(
                "spi: Invalid transfer buffers (tx {} bytes, rx {} bytes)",
                tx.len(),
                rx.len()
            );
            return Err(Error::InvalidArgument);
        }
        if tx.is_empty() {
            if !self.port.is_open() {
                return Err(transfer_error(Error::DeviceNotOpen));
            }
            return Ok(());
        }
        self.port.transfer(tx, rx).map_err(transfer_error)?;
        log::trace!("spi: {:02X?} -> {:02X?}", tx, rx);
        Ok(())
    }

    /// Slave mode is not supported; always fails
    pub fn attach_interrupt(&mut self) -> Result<()> {
        log::error!("spi: SPI slave mode is not currently supported");
        Err(Error::UnsupportedOperation)
    }

    /// No-op, kept for API compatibility
    pub fn detach_interrupt(&mut self) {}

    /// Current clock polarity/phase mode
    pub fn mode(&self) -> DataMode {
        self.mode
    }

    /// Current bit order
    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    /// Authoritative clock setting
    pub fn clock(&self) -> ClockSource {
        self.clock
    }

    /// Clock speed requested from the device
    pub fn clock_speed_hz(&self) -> u32 {
        self.clock.speed_hz()
    }

    /// Chip-select pin driven by `begin()`
    pub fn cs_pin(&self) -> u32 {
        self.cs_pin
    }

    /// Whether the device is open
    pub fn is_open(&self) -> bool {
        self.port.is_open()
    }

    /// Handle of the open device
    pub fn handle(&self) -> Option<RawHandle> {
        self.port.handle()
    }

    /// Get a reference to the port
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Get a mutable reference to the port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Get a reference to the GPIO controller
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Get a reference to the power-management hook
    pub fn power(&self) -> &M {
        &self.power
    }

    /// Take the bus apart, returning its capabilities
    pub fn into_parts(self) -> (P, G, M) {
        (self.port, self.gpio, self.power)
    }
}

fn config_error(what: &str, e: Error) -> Error {
    log::error!("spi: Failed to set SPI {}: {}", what, e);
    match e {
        Error::DeviceNotOpen | Error::InvalidArgument => e,
        _ => Error::ConfigurationRejected,
    }
}

fn transfer_error(e: Error) -> Error {
    log::error!("spi: Failed to execute SPI transfer: {}", e);
    match e {
        Error::DeviceNotOpen => e,
        _ => Error::TransferFailed,
    }
}
