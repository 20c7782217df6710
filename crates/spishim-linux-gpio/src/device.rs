//! Linux GPIO controller implementation
//!
//! This module provides the `LinuxGpio` struct that implements the
//! `GpioController` trait using Linux's GPIO character device interface
//! (gpiocdev). Pins are line offsets on a single gpiochip.
//!
//! Each pin is requested the first time its mode is set and held until the
//! controller is dropped. Pin-mux lines are requested together on the first
//! `mux_select_spi()` call.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use spishim_core::error::Result as CoreResult;
use spishim_core::port::{GpioController, Level, PinMode};

use std::collections::HashMap;

/// Default GPIO chip
pub const DEFAULT_GPIOCHIP: &str = "/dev/gpiochip0";

/// Consumer label shown in `gpioinfo`
const CONSUMER: &str = "spishim";

/// Level a freshly requested output starts at; chip select idles high
const IDLE_LEVEL: Value = Value::Active;

/// One multiplexer select line and the level that routes the SPI function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxLine {
    /// GPIO line offset
    pub offset: Offset,
    /// Level selecting the SPI function
    pub spi_level: bool,
}

/// Configuration for a Linux GPIO controller
#[derive(Debug, Clone)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// Multiplexer lines to drive when routing the SPI pins
    pub mux: Vec<MuxLine>,
}

impl Default for LinuxGpioConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_GPIOCHIP.to_string(),
            mux: Vec::new(),
        }
    }
}

impl LinuxGpioConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Add a multiplexer line
    pub fn with_mux_line(mut self, offset: Offset, spi_level: bool) -> Self {
        self.mux.push(MuxLine { offset, spi_level });
        self
    }
}

/// A requested line and its last configured state
struct PinState {
    request: Request,
    mode: PinMode,
    level: Value,
}

/// Linux GPIO controller using the character device interface
pub struct LinuxGpio {
    device: String,
    mux: Vec<MuxLine>,
    pins: HashMap<Offset, PinState>,
    mux_request: Option<Request>,
}

fn to_value(level: bool) -> Value {
    if level {
        Value::Active
    } else {
        Value::Inactive
    }
}

impl LinuxGpio {
    /// Create a controller; no lines are requested yet
    pub fn new(config: &LinuxGpioConfig) -> Self {
        Self {
            device: config.device.clone(),
            mux: config.mux.clone(),
            pins: HashMap::new(),
            mux_request: None,
        }
    }

    /// Device path
    pub fn device(&self) -> &str {
        &self.device
    }

    fn line_config(offset: Offset, mode: PinMode, level: Value) -> Config {
        let mut cfg = Config::default();
        match mode {
            PinMode::Output => cfg.with_line(offset).as_output(level),
            PinMode::Input => cfg.with_line(offset).as_input(),
        };
        cfg
    }

    fn request(&self, offsets: Vec<Offset>, cfg: Config) -> Result<Request> {
        Request::from_config(cfg)
            .on_chip(&self.device)
            .with_consumer(CONSUMER)
            .request()
            .map_err(|source| LinuxGpioError::LineRequestFailed {
                path: self.device.clone(),
                offsets,
                source,
            })
    }

    /// Level an output on `offset` starts at: the last level written, or
    /// high for a line not requested yet
    fn start_level(&self, offset: Offset) -> Value {
        self.pins
            .get(&offset)
            .map(|p| p.level)
            .unwrap_or(IDLE_LEVEL)
    }

    /// Set the direction of a line, requesting it if needed
    ///
    /// A fresh output is requested already driven high so chip select
    /// never glitches active while `begin()` parks it.
    pub fn set_pin_mode(&mut self, offset: Offset, mode: PinMode) -> Result<()> {
        let level = self.start_level(offset);
        let cfg = Self::line_config(offset, mode, level);

        match self.pins.get_mut(&offset) {
            Some(pin) => {
                pin.request
                    .reconfigure(&cfg)
                    .map_err(|source| LinuxGpioError::ReconfigureFailed { offset, source })?;
                pin.mode = mode;
            }
            None => {
                let request = self.request(vec![offset], cfg)?;
                self.pins.insert(
                    offset,
                    PinState {
                        request,
                        mode,
                        level,
                    },
                );
            }
        }

        log::debug!("linux_gpio: Line {} on {} set to {:?}", offset, self.device, mode);
        Ok(())
    }

    /// Drive an output line
    pub fn set_level(&mut self, offset: Offset, high: bool) -> Result<()> {
        let pin = match self.pins.get_mut(&offset) {
            Some(pin) if pin.mode == PinMode::Output => pin,
            _ => return Err(LinuxGpioError::NotOutput(offset)),
        };
        let value = to_value(high);
        pin.request
            .set_value(offset, value)
            .map_err(|source| LinuxGpioError::SetValueFailed { offset, source })?;
        pin.level = value;
        log::trace!("linux_gpio: Line {} = {}", offset, high as u8);
        Ok(())
    }

    /// Drive the multiplexer lines to route (or release) the SPI function
    pub fn select_spi(&mut self, enable: bool) -> Result<()> {
        if self.mux.is_empty() {
            return Ok(());
        }
        let level_for = |line: &MuxLine| to_value(line.spi_level == enable);

        if self.mux_request.is_none() {
            let mut cfg = Config::default();
            for line in &self.mux {
                cfg.with_line(line.offset).as_output(level_for(line));
            }
            let offsets = self.mux.iter().map(|l| l.offset).collect();
            let request = self.request(offsets, cfg)?;
            self.mux_request = Some(request);
        } else if let Some(request) = &self.mux_request {
            for line in &self.mux {
                request
                    .set_value(line.offset, level_for(line))
                    .map_err(|source| LinuxGpioError::SetValueFailed {
                        offset: line.offset,
                        source,
                    })?;
            }
        }

        log::debug!(
            "linux_gpio: SPI pin mux {}",
            if enable { "selected" } else { "released" }
        );
        Ok(())
    }
}

/// Convert a backend error to its core category
///
/// The bus logs the failure; the detailed cause is kept at debug level.
fn report(result: Result<()>) -> CoreResult<()> {
    result.map_err(|e| {
        log::debug!("linux_gpio: {}", e);
        e.kind()
    })
}

impl GpioController for LinuxGpio {
    fn pin_mode(&mut self, pin: u32, mode: PinMode) -> CoreResult<()> {
        report(self.set_pin_mode(pin, mode))
    }

    fn digital_write(&mut self, pin: u32, level: Level) -> CoreResult<()> {
        report(self.set_level(pin, level == Level::High))
    }

    fn mux_select_spi(&mut self, enable: bool) -> CoreResult<()> {
        report(self.select_spi(enable))
    }
}

/// Parse a `mux` option: `offset:level` pairs separated by `+`
fn parse_mux(value: &str) -> std::result::Result<Vec<MuxLine>, String> {
    value
        .split('+')
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (offset, level) = entry
                .split_once(':')
                .ok_or_else(|| format!("Invalid mux entry '{}' (expected offset:level)", entry))?;
            let offset = offset
                .parse()
                .map_err(|_| format!("Invalid mux line offset: {}", offset))?;
            let spi_level = match level {
                "0" => false,
                "1" => true,
                _ => return Err(format!("Invalid mux level '{}' (must be 0 or 1)", level)),
            };
            Ok(MuxLine { offset, spi_level })
        })
        .collect()
}

/// Parse GPIO options from a list of key-value pairs
///
/// - `gpiochip=N` or `gpiodev=/dev/gpiochipN` - GPIO chip (default: /dev/gpiochip0)
/// - `mux=40:1+41:0` - multiplexer lines and the level that selects SPI
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxGpioConfig, String> {
    let mut config = LinuxGpioConfig::default();
    let mut gpiochip: Option<u32> = None;
    let mut gpiodev: Option<String> = None;

    for (key, value) in options {
        match *key {
            "gpiochip" => {
                gpiochip = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid gpiochip value: {}", value))?,
                );
            }
            "gpiodev" => {
                gpiodev = Some(value.to_string());
            }
            "mux" => {
                config.mux = parse_mux(value)?;
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    match (gpiochip, gpiodev) {
        (Some(_), Some(_)) => {
            return Err("Only one of 'gpiochip' or 'gpiodev' can be specified".to_string());
        }
        (Some(n), None) => config.device = format!("/dev/gpiochip{}", n),
        (None, Some(dev)) => config.device = dev,
        (None, None) => {}
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spishim_core::Error as CoreError;

    #[test]
    fn test_parse_options_defaults() {
        let config = parse_options(&[]).unwrap();
        assert_eq!(config.device, DEFAULT_GPIOCHIP);
        assert!(config.mux.is_empty());
    }

    #[test]
    fn test_parse_options_chip() {
        let config = parse_options(&[("gpiochip", "2")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip2");

        let config = parse_options(&[("gpiodev", "/dev/gpiochip5")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip5");

        assert!(parse_options(&[("gpiochip", "x")]).is_err());
        assert!(parse_options(&[("gpiochip", "1"), ("gpiodev", "/dev/gpiochip1")]).is_err());
    }

    #[test]
    fn test_parse_mux() {
        let config = parse_options(&[("mux", "40:1+41:0")]).unwrap();
        assert_eq!(
            config.mux,
            vec![
                MuxLine {
                    offset: 40,
                    spi_level: true
                },
                MuxLine {
                    offset: 41,
                    spi_level: false
                },
            ]
        );

        assert!(parse_options(&[("mux", "40")]).is_err());
        assert!(parse_options(&[("mux", "40:2")]).is_err());
        assert!(parse_options(&[("mux", "a:1")]).is_err());
    }

    #[test]
    fn test_no_mux_is_noop() {
        let mut gpio = LinuxGpio::new(&LinuxGpioConfig::new("/dev/does-not-exist-gpiochip"));
        assert_eq!(gpio.mux_select_spi(true), Ok(()));
    }

    #[test]
    fn test_fresh_output_starts_high() {
        let gpio = LinuxGpio::new(&LinuxGpioConfig::default());
        assert_eq!(gpio.start_level(10), Value::Active);
        assert_eq!(gpio.start_level(0), Value::Active);
    }

    #[test]
    fn test_write_before_pin_mode() {
        let mut gpio = LinuxGpio::new(&LinuxGpioConfig::default());
        assert_eq!(gpio.digital_write(10, Level::High), Err(CoreError::GpioFailed));
    }

    #[test]
    fn test_missing_chip() {
        let mut gpio = LinuxGpio::new(
            &LinuxGpioConfig::new("/dev/does-not-exist-gpiochip").with_mux_line(3, true),
        );
        assert_eq!(gpio.pin_mode(10, PinMode::Output), Err(CoreError::GpioFailed));
        assert_eq!(gpio.mux_select_spi(true), Err(CoreError::GpioFailed));
    }
}
