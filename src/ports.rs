//! Port registration and dispatch
//!
//! This module provides the registry of SPI ports the CLI can open, with
//! support for feature-gated inclusion and `name:key=value,...` port
//! strings.

use crate::cli::BusArgs;
use spishim_core::port::{GpioController, PowerManagement, SpiPort};
use spishim_core::{BitOrder, DataMode, SpiBus};

/// Bus type used by the CLI, with every capability boxed
pub type Bus = SpiBus<Box<dyn SpiPort>, Box<dyn GpioController>, Box<dyn PowerManagement>>;

/// Information about a port
pub struct PortInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available ports (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_ports() -> Vec<PortInfo> {
    let mut ports = Vec::new();

    #[cfg(feature = "dummy")]
    ports.push(PortInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory loopback port for testing (idle=<hex byte> disables loopback)",
    });

    #[cfg(feature = "linux-spi")]
    ports.push(PortInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux spidev interface (dev=/dev/spidevX.Y,power=<sysfs power/control>)",
    });

    ports
}

/// Parsed port string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortParams {
    /// Port name
    pub name: String,
    /// Options in the order given
    pub params: Vec<(String, String)>,
}

impl PortParams {
    /// Options as borrowed pairs, optionally restricted to `keys`
    fn options<'a>(&'a self, keys: Option<&[&str]>) -> Vec<(&'a str, &'a str)> {
        self.params
            .iter()
            .filter(|(k, _)| keys.map_or(true, |keys| keys.contains(&k.as_str())))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a port string (e.g., "linux_spi:dev=/dev/spidev0.0,gpiochip=0")
pub fn parse_port_params(s: &str) -> Result<PortParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.push((key.to_string(), value.to_string()));
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(PortParams {
        name: name.to_string(),
        params,
    })
}

/// Open the port named in `args`, bring the bus up and apply the requested
/// mode, bit order and clock
pub fn open_bus(args: &BusArgs) -> Result<Bus, Box<dyn std::error::Error>> {
    let params = parse_port_params(&args.port)?;

    let (port, gpio, power) = match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params)?,

        #[cfg(feature = "linux-spi")]
        "linux_spi" | "linux-spi" | "spidev" => open_linux_spi(&params)?,

        _ => return Err(format!("Unknown port: {}", params.name).into()),
    };

    let mut bus = SpiBus::new(port, gpio, power).with_cs_pin(args.cs);
    bus.begin()?;

    bus.set_data_mode(DataMode::try_from(args.mode)?)?;
    bus.set_bit_order(if args.lsb_first {
        BitOrder::LsbFirst
    } else {
        BitOrder::MsbFirst
    })?;
    if let Some(div) = args.divider {
        bus.set_clock_divider(div)?;
    } else if let Some(hz) = args.speed {
        bus.set_clock_speed(hz)?;
    }

    log::info!(
        "Bus ready on {} ({}, {}, clock {})",
        params.name,
        bus.mode(),
        bus.bit_order(),
        bus.clock()
    );

    Ok(bus)
}

type Parts = (
    Box<dyn SpiPort>,
    Box<dyn GpioController>,
    Box<dyn PowerManagement>,
);

#[cfg(feature = "dummy")]
fn open_dummy(params: &PortParams) -> Result<Parts, Box<dyn std::error::Error>> {
    use spishim_dummy::{DummyGpio, DummyPort, DummyPower};

    let mut port = DummyPort::loopback();
    for (key, value) in params.options(None) {
        match key {
            "idle" => port = DummyPort::with_idle_byte(crate::cli::parse_hex_byte(value)?),
            _ => log::warn!("dummy: Unknown option: {}={}", key, value),
        }
    }

    let port: Box<dyn SpiPort> = Box::new(port);
    let gpio: Box<dyn GpioController> = Box::new(DummyGpio::new());
    let power: Box<dyn PowerManagement> = Box::new(DummyPower::new());
    Ok((port, gpio, power))
}

#[cfg(feature = "linux-spi")]
fn open_linux_spi(params: &PortParams) -> Result<Parts, Box<dyn std::error::Error>> {
    const SPI_KEYS: &[&str] = &["dev", "power"];
    const GPIO_KEYS: &[&str] = &["gpiochip", "gpiodev", "mux"];

    for (key, value) in params.options(None) {
        if !SPI_KEYS.contains(&key) && !GPIO_KEYS.contains(&key) {
            log::warn!("linux_spi: Unknown option: {}={}", key, value);
        }
    }

    let (port, power) = spishim_linux_spi::linux_spi_from_options(&params.options(Some(SPI_KEYS)))?;

    // The spidev driver owns chip select unless GPIO options ask otherwise
    let gpio_options = params.options(Some(GPIO_KEYS));
    let gpio: Box<dyn GpioController> = if gpio_options.is_empty() {
        Box::new(spishim_core::port::NoGpio)
    } else {
        open_linux_gpio(&gpio_options)?
    };

    Ok((port, gpio, power))
}

#[cfg(all(feature = "linux-spi", feature = "linux-gpio"))]
fn open_linux_gpio(
    options: &[(&str, &str)],
) -> Result<Box<dyn GpioController>, Box<dyn std::error::Error>> {
    spishim_linux_gpio::linux_gpio_from_options(options)
}

#[cfg(all(feature = "linux-spi", not(feature = "linux-gpio")))]
fn open_linux_gpio(
    _options: &[(&str, &str)],
) -> Result<Box<dyn GpioController>, Box<dyn std::error::Error>> {
    Err("GPIO options require the linux-gpio feature".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_params() {
        let p = parse_port_params("dummy").unwrap();
        assert_eq!(p.name, "dummy");
        assert!(p.params.is_empty());

        let p = parse_port_params("linux_spi:dev=/dev/spidev0.1,mux=42:1+43:0").unwrap();
        assert_eq!(p.name, "linux_spi");
        assert_eq!(
            p.params,
            vec![
                ("dev".to_string(), "/dev/spidev0.1".to_string()),
                ("mux".to_string(), "42:1+43:0".to_string()),
            ]
        );
        assert_eq!(p.options(Some(&["mux"])), vec![("mux", "42:1+43:0")]);

        assert!(parse_port_params("linux_spi:dev").is_err());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_bus() {
        let args = BusArgs {
            port: "dummy".to_string(),
            mode: 3,
            lsb_first: true,
            divider: Some(spishim_core::ClockDivider::Div16),
            speed: None,
            cs: 10,
        };
        let mut bus = open_bus(&args).unwrap();
        assert!(bus.is_open());
        assert_eq!(bus.mode(), DataMode::Mode3);
        assert_eq!(bus.bit_order(), BitOrder::LsbFirst);
        assert_eq!(bus.clock_speed_hz(), 1_000_000);
        assert_eq!(bus.transfer(0x42), Ok(0x42));
    }

    #[test]
    fn test_unknown_port() {
        let args = BusArgs {
            port: "nonexistent".to_string(),
            mode: 0,
            lsb_first: false,
            divider: None,
            speed: None,
            cs: 10,
        };
        assert!(open_bus(&args).is_err());
    }
}
