//! CLI argument parsing

use clap::{Parser, Subcommand};
use spishim_core::{ClockDivider, DEFAULT_CS_PIN};

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse one byte written in hex, with or without a 0x prefix
pub fn parse_hex_byte(s: &str) -> Result<u8, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(digits, 16).map_err(|e| format!("Invalid byte '{}': {}", s, e))
}

/// Parse a divide ratio (1, 2, 4, ..., 128)
fn parse_divider(s: &str) -> Result<ClockDivider, String> {
    let ratio: u32 = s
        .parse()
        .map_err(|e| format!("Invalid divider: {}", e))?;
    ClockDivider::from_ratio(ratio)
        .ok_or_else(|| format!("Invalid divider {} (must be 1, 2, 4, 8, 16, 32, 64 or 128)", ratio))
}

const PORT_HELP: &str = "Port to use, with options [dummy, linux_spi]\n\
     e.g. linux_spi:dev=/dev/spidev1.0,gpiochip=0,mux=42:1,power=/sys/.../power/control";

#[derive(Parser)]
#[command(name = "spishim")]
#[command(author, version, about = "Arduino-style SPI master for Linux spidev", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log level for the requested verbosity; `RUST_LOG` overrides it
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Bus options shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct BusArgs {
    /// Port to use
    #[arg(short, long, default_value = "linux_spi", help = PORT_HELP)]
    pub port: String,

    /// SPI mode (0-3)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub mode: u8,

    /// Shift the least significant bit first
    #[arg(long)]
    pub lsb_first: bool,

    /// Clock divider (1, 2, 4, ..., 128); DIV4 is 4 MHz
    #[arg(short, long, value_parser = parse_divider, conflicts_with = "speed")]
    pub divider: Option<ClockDivider>,

    /// Explicit clock speed in Hz (clamped to 25 MHz)
    #[arg(short, long, value_parser = parse_hex_u32)]
    pub speed: Option<u32>,

    /// Chip-select GPIO line driven high by begin()
    #[arg(long, default_value_t = DEFAULT_CS_PIN)]
    pub cs: u32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Exchange bytes with the device and print what comes back
    Transfer {
        #[command(flatten)]
        bus: BusArgs,

        /// Bytes to send, in hex (e.g. 9f 00 00)
        #[arg(required = true, value_parser = parse_hex_byte)]
        data: Vec<u8>,
    },

    /// Self-test with MOSI wired to MISO
    Loopback {
        #[command(flatten)]
        bus: BusArgs,

        /// Length of the buffer pattern
        #[arg(short, long, default_value_t = 4)]
        len: usize,
    },

    /// List available ports
    ListPorts,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(
            parse(&["spishim", "list-ports"]).log_level(),
            log::LevelFilter::Info
        );
        assert_eq!(
            parse(&["spishim", "-v", "list-ports"]).log_level(),
            log::LevelFilter::Debug
        );
        assert_eq!(
            parse(&["spishim", "list-ports", "-vv"]).log_level(),
            log::LevelFilter::Trace
        );
        assert_eq!(
            parse(&["spishim", "-vvv", "list-ports"]).log_level(),
            log::LevelFilter::Trace
        );
    }
}
