//! spishim-dummy - In-memory SPI port for testing
//!
//! This crate provides a dummy SPI port that records every setting pushed
//! to it and answers transfers either as a MOSI-to-MISO loopback or with a
//! fixed idle byte. Failures can be injected per operation. Recording GPIO
//! and power-management fakes are included so `SpiBus::begin()` can be
//! checked end to end without hardware.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use spishim_core::error::{Error, Result};
use spishim_core::port::{Level, PinMode, PowerManagement, RawHandle};
#[cfg(feature = "alloc")]
use spishim_core::port::{GpioController, SpiPort};


/// First handle value handed out by a dummy port
#[cfg(feature = "alloc")]
const FIRST_HANDLE: RawHandle = 3;

/// Configuration for the dummy port
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Echo transmitted bytes back (MOSI tied to MISO)
    pub loopback: bool,
    /// Byte received on every clock when not in loopback
    pub idle_byte: u8,
    /// Highest speed the fake driver accepts; faster requests are rejected
    pub max_speed_hz: Option<u32>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            loopback: true,
            idle_byte: 0xFF,
            max_speed_hz: None,
        }
    }
}

/// Settings the fake device currently holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedConfig {
    /// Last native mode written
    pub mode: Option<u8>,
    /// Last LSB-first flag written
    pub lsb_first: Option<bool>,
    /// Last max speed written
    pub speed_hz: Option<u32>,
}

/// Dummy SPI port
///
/// Emulates a spidev device in memory for testing purposes.
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct DummyPort {
    config: DummyConfig,
    handle: Option<RawHandle>,
    next_handle: RawHandle,
    open_count: usize,
    applied: AppliedConfig,
    config_writes: usize,
    speed_writes: Vec<u32>,
    sent: Vec<u8>,
    /// Fail the next `open()` calls
    pub fail_open: bool,
    /// Reject every configuration write
    pub reject_config: bool,
    /// Fail every transfer
    pub fail_transfer: bool,
}

#[cfg(feature = "alloc")]
impl DummyPort {
    /// Create a new dummy port with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            next_handle: FIRST_HANDLE,
            ..Default::default()
        }
    }

    /// Create a loopback port (MOSI tied to MISO)
    pub fn loopback() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a port where the peripheral always answers `idle_byte`
    pub fn with_idle_byte(idle_byte: u8) -> Self {
        Self::new(DummyConfig {
            loopback: false,
            idle_byte,
            ..Default::default()
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Settings currently held by the fake device
    pub fn applied(&self) -> AppliedConfig {
        self.applied
    }

    /// Number of times the device was actually opened
    pub fn open_count(&self) -> usize {
        self.open_count
    }

    /// Number of successful configuration writes
    pub fn config_writes(&self) -> usize {
        self.config_writes
    }

    /// Every speed submitted, accepted or not
    pub fn speed_writes(&self) -> &[u32] {
        &self.speed_writes
    }

    /// Every byte shifted out by successful transfers
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    fn check_open(&self) -> Result<()> {
        if self.handle.is_none() {
            return Err(Error::DeviceNotOpen);
        }
        Ok(())
    }

    fn check_config(&self) -> Result<()> {
        self.check_open()?;
        if self.reject_config {
            return Err(Error::ConfigurationRejected);
        }
        Ok(())
    }
}

#[cfg(feature = "alloc")]
impl SpiPort for DummyPort {
    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(Error::DeviceOpenFailed);
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.handle = Some(handle);
        self.open_count += 1;
        log::debug!("dummy: Opened handle {}", handle);
        Ok(())
    }

    fn close(&mut self) {
        self.handle = None;
    }

    fn handle(&self) -> Option<RawHandle> {
        self.handle
    }

    fn write_lsb_first(&mut self, lsb_first: bool) -> Result<()> {
        self.check_config()?;
        self.applied.lsb_first = Some(lsb_first);
        self.config_writes += 1;
        Ok(())
    }

    fn write_mode(&mut self, mode: u8) -> Result<()> {
        self.check_config()?;
        if mode > 3 {
            return Err(Error::InvalidArgument);
        }
        self.applied.mode = Some(mode);
        self.config_writes += 1;
        Ok(())
    }

    fn write_max_speed_hz(&mut self, speed_hz: u32) -> Result<()> {
        self.speed_writes.push(speed_hz);
        self.check_config()?;
        if matches!(self.config.max_speed_hz, Some(max) if speed_hz > max) {
            return Err(Error::ConfigurationRejected);
        }
        self.applied.speed_hz = Some(speed_hz);
        self.config_writes += 1;
        Ok(())
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        self.check_open()?;
        if self.fail_transfer {
            return Err(Error::TransferFailed);
        }
        if tx.len() != rx.len() {
            return Err(Error::InvalidArgument);
        }
        if self.config.loopback {
            rx.copy_from_slice(tx);
        } else {
            rx.fill(self.config.idle_byte);
        }
        self.sent.extend_from_slice(tx);
        Ok(())
    }
}

/// A GPIO call recorded by `DummyGpio`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioEvent {
    /// `pin_mode(pin, mode)`
    PinMode(u32, PinMode),
    /// `digital_write(pin, level)`
    Write(u32, Level),
    /// `mux_select_spi(enable)`
    MuxSelectSpi(bool),
}

/// GPIO controller that records calls
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct DummyGpio {
    events: Vec<GpioEvent>,
    /// Fail every call
    pub fail: bool,
}

#[cfg(feature = "alloc")]
impl DummyGpio {
    /// Create a new recording GPIO controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far, oldest first
    pub fn events(&self) -> &[GpioEvent] {
        &self.events
    }

    fn record(&mut self, event: GpioEvent) -> Result<()> {
        if self.fail {
            return Err(Error::GpioFailed);
        }
        self.events.push(event);
        Ok(())
    }
}

#[cfg(feature = "alloc")]
impl GpioController for DummyGpio {
    fn pin_mode(&mut self, pin: u32, mode: PinMode) -> Result<()> {
        self.record(GpioEvent::PinMode(pin, mode))
    }

    fn digital_write(&mut self, pin: u32, level: Level) -> Result<()> {
        self.record(GpioEvent::Write(pin, level))
    }

    fn mux_select_spi(&mut self, enable: bool) -> Result<()> {
        self.record(GpioEvent::MuxSelectSpi(enable))
    }
}

/// Power-management hook that counts calls
#[derive(Debug, Default)]
pub struct DummyPower {
    calls: usize,
    /// Fail every call
    pub fail: bool,
}

impl DummyPower {
    /// Create a new counting hook
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `disable_autosuspend` calls
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl PowerManagement for DummyPower {
    fn disable_autosuspend(&mut self) -> Result<()> {
        self.calls += 1;
        if self.fail {
            return Err(Error::PowerManagementFailed);
        }
        Ok(())
    }
}
